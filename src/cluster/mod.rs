//! Cluster analysis module

pub mod evaluator;
pub mod metrics;

pub use evaluator::BoundaryClusterEvaluator;

use crate::error::Result;
use crate::graph::WeightedGraph;
use crate::louvain::Partition;
use serde::{Serialize, Deserialize};

/// A community together with its edge profile in the full graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Position of this cluster in its set (and of its community in the partition)
    pub id: u32,

    /// Members of this cluster (vertex indices, sorted)
    pub members: Vec<u32>,

    /// Size of the cluster
    pub size: usize,

    /// Members with at least one edge leaving or entering the cluster
    pub border: Vec<u32>,

    /// Total weight of edges with both endpoints inside the cluster
    pub internal_weight: f64,

    /// Total weight of edges leaving the cluster
    pub outgoing_weight: f64,

    /// Total weight of edges entering the cluster
    pub incoming_weight: f64,

    /// Outgoing inter-cluster weight per target cluster, sorted by cluster id
    pub neighbors: Vec<(u32, f64)>,

    /// Density: internal edges / potential edges
    pub density: f32,
}

impl Cluster {
    pub fn is_singleton(&self) -> bool {
        self.size == 1
    }
}

/// All clusters of a graph plus the vertex -> cluster map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSet {
    pub clusters: Vec<Cluster>,

    /// membership[v] is the id of the cluster containing vertex v
    pub membership: Vec<u32>,
}

impl ClusterSet {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Cluster containing a vertex
    pub fn cluster_of(&self, vertex: u32) -> Option<&Cluster> {
        self.membership
            .get(vertex as usize)
            .and_then(|&id| self.clusters.get(id as usize))
    }
}

/// Strategy turning a partition into clusters
pub trait ClusterEvaluator: Send + Sync {
    fn build_clusters(&self, graph: &WeightedGraph, partition: &Partition) -> Result<ClusterSet>;
}
