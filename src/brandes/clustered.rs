//! Clustered approximate betweenness centrality
//!
//! The orchestrator runs the pipeline stages in a fixed order:
//! clustering, pivot selection, accumulation from pivots, then the rescaled
//! merge. Any stage failure aborts the whole computation.

use crate::brandes::{PivotSelector, PivotSet, ScalingPolicy, SingleSourceBc};
use crate::brandes::{ClusterSizeScaling, DegreePivotSelector, DijkstraBrandes};
use crate::cluster::{BoundaryClusterEvaluator, ClusterEvaluator};
use crate::error::{FastBcError, Result};
use crate::graph::WeightedGraph;
use crate::louvain::CommunityEvaluator;
use ndarray::Array1;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Number of pivots each accumulation task handles by default
pub const DEFAULT_CHUNK_SIZE: usize = 16;

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    Clustering,
    PivotSelection,
    Accumulation,
    Rescale,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Clustering => "clustering",
            Stage::PivotSelection => "pivot selection",
            Stage::Accumulation => "accumulation",
            Stage::Rescale => "rescale",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Scores of a run together with what produced them
#[derive(Debug, Clone, Serialize)]
pub struct BcReport {
    #[serde(skip)]
    pub scores: Array1<f64>,

    /// Seed of the chosen Louvain run, if the partition came from one
    pub seed: Option<u64>,

    pub modularity: f64,
    pub community_count: usize,
    pub pivot_count: usize,
    pub cluster_sizes: Vec<usize>,
}

/// Clustered Brandes betweenness, assembled from pluggable stages
pub struct ClusteredBrandesBc {
    communities: Box<dyn CommunityEvaluator>,
    clusters: Box<dyn ClusterEvaluator>,
    pivots: Box<dyn PivotSelector>,
    accumulator: Box<dyn SingleSourceBc>,
    scaling: Box<dyn ScalingPolicy>,
    chunk_size: usize,
}

impl std::fmt::Debug for ClusteredBrandesBc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusteredBrandesBc")
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl ClusteredBrandesBc {
    /// Compose the pipeline with the default cluster evaluator, pivot
    /// selector, accumulator and scaling policy.
    pub fn new(communities: Box<dyn CommunityEvaluator>) -> Self {
        Self {
            communities,
            clusters: Box::new(BoundaryClusterEvaluator),
            pivots: Box::new(DegreePivotSelector::default()),
            accumulator: Box::new(DijkstraBrandes),
            scaling: Box::new(ClusterSizeScaling),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_cluster_evaluator(mut self, clusters: Box<dyn ClusterEvaluator>) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn with_pivot_selector(mut self, pivots: Box<dyn PivotSelector>) -> Self {
        self.pivots = pivots;
        self
    }

    pub fn with_accumulator(mut self, accumulator: Box<dyn SingleSourceBc>) -> Self {
        self.accumulator = accumulator;
        self
    }

    pub fn with_scaling(mut self, scaling: Box<dyn ScalingPolicy>) -> Self {
        self.scaling = scaling;
        self
    }

    /// Pivots per accumulation task; values below one are raised to one
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Estimated betweenness of every vertex, in graph index order
    pub fn compute_bc(&self, graph: &WeightedGraph) -> Result<Array1<f64>> {
        self.compute_report(graph).map(|report| report.scores)
    }

    /// Run the whole pipeline and keep the intermediate metadata
    pub fn compute_report(&self, graph: &WeightedGraph) -> Result<BcReport> {
        let n = graph.node_count();
        let mut stage = Stage::Init;
        let started = Instant::now();

        enter(&mut stage, Stage::Clustering);
        let partition = self.communities.evaluate(graph)?;
        partition.validate(n)?;
        let clusters = self.clusters.build_clusters(graph, &partition)?;

        enter(&mut stage, Stage::PivotSelection);
        let pivots = self.pivots.select_pivots(&clusters, graph)?;
        let jobs = self.scaled_jobs(&pivots, n)?;

        enter(&mut stage, Stage::Accumulation);
        let partials = self.accumulate(graph, &jobs);

        enter(&mut stage, Stage::Rescale);
        let scores = merge_partials(&partials, n);

        enter(&mut stage, Stage::Done);
        log::info!(
            "Betweenness estimated from {} pivots over {} vertices in {:.3}s",
            jobs.len(),
            n,
            started.elapsed().as_secs_f64()
        );

        Ok(BcReport {
            scores,
            seed: partition.seed,
            modularity: partition.modularity,
            community_count: partition.len(),
            pivot_count: jobs.len(),
            cluster_sizes: clusters.clusters.iter().map(|c| c.size).collect(),
        })
    }

    /// Attach each pivot's scale factor
    fn scaled_jobs(&self, pivots: &PivotSet, vertex_count: usize) -> Result<Vec<(u32, f64)>> {
        let mut jobs = Vec::with_capacity(pivots.len());

        for entry in &pivots.entries {
            if entry.pivots.is_empty() {
                return Err(FastBcError::Selection { cluster: entry.cluster });
            }
            let factor = self.scaling.factor(entry.cluster_size, entry.pivots.len(), vertex_count);
            if !factor.is_finite() || factor < 0.0 {
                return Err(FastBcError::InternalConsistency(format!(
                    "scale factor {} for cluster {} is not a non-negative number",
                    factor, entry.cluster
                )));
            }
            for &pivot in &entry.pivots {
                if pivot as usize >= vertex_count {
                    return Err(FastBcError::InternalConsistency(format!(
                        "pivot {} of cluster {} is outside the graph",
                        pivot, entry.cluster
                    )));
                }
                jobs.push((pivot, factor));
            }
        }

        Ok(jobs)
    }

    /// One scaled partial vector per chunk of pivots, in chunk order
    fn accumulate(&self, graph: &WeightedGraph, jobs: &[(u32, f64)]) -> Vec<Array1<f64>> {
        log::info!(
            "Accumulating {} pivots in chunks of {}",
            jobs.len(),
            self.chunk_size
        );

        jobs.par_chunks(self.chunk_size)
            .map(|chunk| {
                let mut local = Array1::zeros(graph.node_count());
                self.accumulator.accumulate_batch(graph, chunk, &mut local);
                local
            })
            .collect()
    }
}

fn enter(stage: &mut Stage, next: Stage) {
    log::info!("Stage {} -> {}", stage, next);
    *stage = next;
}

/// Sum partial score vectors in the order given
pub fn merge_partials(partials: &[Array1<f64>], vertex_count: usize) -> Array1<f64> {
    partials
        .iter()
        .fold(Array1::zeros(vertex_count), |mut acc, partial| {
            acc += partial;
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brandes::{ExhaustivePivotSelector, UnitScaling};
    use crate::louvain::{LouvainEvaluator, SingleCommunityEvaluator};

    const EPS: f64 = 1e-9;

    fn exact() -> ClusteredBrandesBc {
        ClusteredBrandesBc::new(Box::new(SingleCommunityEvaluator))
            .with_pivot_selector(Box::new(ExhaustivePivotSelector))
            .with_scaling(Box::new(UnitScaling))
    }

    fn path() -> WeightedGraph {
        // 0 -> 1 -> 2 -> 3
        WeightedGraph::from_adjacency(vec![vec![(1, 1.0)], vec![(2, 1.0)], vec![(3, 1.0)], vec![]], None)
    }

    #[test]
    fn exact_configuration_matches_brandes_on_a_path() {
        let bc = exact().compute_bc(&path()).unwrap();
        // 1 lies on 0->2 and 0->3, 2 lies on 0->3 and 1->3
        assert_eq!(bc.to_vec(), vec![0.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn chunk_size_does_not_change_the_result() {
        let g = path();
        let one = exact().with_chunk_size(1).compute_bc(&g).unwrap();
        let many = exact().with_chunk_size(64).compute_bc(&g).unwrap();
        for (a, b) in one.iter().zip(many.iter()) {
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn merge_order_does_not_matter() {
        let partials = vec![
            Array1::from(vec![0.1, 0.2, 0.3]),
            Array1::from(vec![1e-3, 5.0, 0.0]),
            Array1::from(vec![7.25, 0.0, 1.0 / 3.0]),
        ];
        let forward = merge_partials(&partials, 3);
        let reversed: Vec<_> = partials.iter().rev().cloned().collect();
        let backward = merge_partials(&reversed, 3);
        for (a, b) in forward.iter().zip(backward.iter()) {
            assert!((a - b).abs() < EPS);
        }
    }

    #[test]
    fn empty_graph_yields_empty_vector() {
        let g = WeightedGraph::from_adjacency(Vec::new(), None);
        let evaluator = LouvainEvaluator::new(vec![1, 2], 2, 0.01).unwrap();
        let bc = ClusteredBrandesBc::new(Box::new(evaluator)).compute_bc(&g).unwrap();
        assert_eq!(bc.len(), 0);
    }

    #[test]
    fn report_describes_the_run() {
        let g = path();
        let evaluator = LouvainEvaluator::new(vec![3], 1, 0.01).unwrap();
        let report = ClusteredBrandesBc::new(Box::new(evaluator)).compute_report(&g).unwrap();

        assert_eq!(report.seed, Some(3));
        assert_eq!(report.scores.len(), 4);
        assert_eq!(report.pivot_count, report.community_count);
        assert_eq!(report.cluster_sizes.iter().sum::<usize>(), 4);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Init < Stage::Clustering);
        assert!(Stage::Accumulation < Stage::Rescale);
        assert_eq!(Stage::PivotSelection.to_string(), "pivot selection");
    }
}
