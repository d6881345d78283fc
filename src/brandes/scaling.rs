//! Scaling policies for pivot contributions

use crate::brandes::ScalingPolicy;

/// Each pivot stands in for an equal share of its cluster's members.
///
/// The factors of all pivots sum to the number of vertices, so the estimate
/// keeps the scale of an all-sources computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterSizeScaling;

impl ScalingPolicy for ClusterSizeScaling {
    fn factor(&self, cluster_size: usize, pivot_count: usize, _vertex_count: usize) -> f64 {
        if pivot_count == 0 {
            return 0.0;
        }
        cluster_size as f64 / pivot_count as f64
    }
}

/// Contributions are summed unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitScaling;

impl ScalingPolicy for UnitScaling {
    fn factor(&self, _cluster_size: usize, _pivot_count: usize, _vertex_count: usize) -> f64 {
        1.0
    }
}
