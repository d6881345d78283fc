//! Input data loading

pub mod edge_list;
