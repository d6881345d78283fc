//! Betweenness centrality: pivot selection, single-source accumulation and
//! the clustered orchestrator that ties the stages together.

pub mod clustered;
pub mod dijkstra;
pub mod pivot;
pub mod scaling;

pub use clustered::{merge_partials, BcReport, ClusteredBrandesBc, Stage};
pub use dijkstra::{shortest_paths, DijkstraBrandes, ShortestPaths, SsspWorkspace};
pub use pivot::{ClusterPivots, DegreePivotSelector, ExhaustivePivotSelector, PivotSet};
pub use scaling::{ClusterSizeScaling, UnitScaling};

use crate::cluster::ClusterSet;
use crate::error::Result;
use crate::graph::WeightedGraph;
use ndarray::Array1;

/// Strategy choosing the shortest-path sources of each cluster
pub trait PivotSelector: Send + Sync {
    fn select_pivots(&self, clusters: &ClusterSet, graph: &WeightedGraph) -> Result<PivotSet>;
}

/// Single-source Brandes dependency accumulation
pub trait SingleSourceBc: Send + Sync {
    /// Dependency of `source` on every vertex; the source itself scores 0
    fn accumulate_from(&self, graph: &WeightedGraph, source: u32) -> Array1<f64>;

    /// Add `factor` times the dependency vector of `source` into `out`
    fn accumulate_into(&self, graph: &WeightedGraph, source: u32, factor: f64, out: &mut Array1<f64>) {
        out.scaled_add(factor, &self.accumulate_from(graph, source));
    }

    /// Accumulate a batch of `(source, factor)` jobs into one vector
    fn accumulate_batch(&self, graph: &WeightedGraph, jobs: &[(u32, f64)], out: &mut Array1<f64>) {
        for &(source, factor) in jobs {
            self.accumulate_into(graph, source, factor, out);
        }
    }
}

/// Weight given to a pivot's contribution when estimating full betweenness
pub trait ScalingPolicy: Send + Sync {
    fn factor(&self, cluster_size: usize, pivot_count: usize, vertex_count: usize) -> f64;
}
