//! Graph representation module

pub mod compressed;
pub mod builder;

pub use builder::GraphBuilder;
pub use compressed::WeightedGraph;
