//! Clustered approximate betweenness centrality for weighted directed graphs

pub mod brandes;
pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod louvain;
pub mod storage;

pub use brandes::{BcReport, ClusteredBrandesBc};
pub use config::Config;
pub use error::FastBcError;
pub use graph::WeightedGraph;
