//! Pivot selection

use crate::brandes::PivotSelector;
use crate::cluster::metrics::{rank_members, RankingSignal};
use crate::cluster::{Cluster, ClusterSet};
use crate::error::{FastBcError, Result};
use crate::graph::WeightedGraph;
use serde::{Serialize, Deserialize};

/// Pivots chosen for one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPivots {
    pub cluster: u32,

    /// Number of vertices the pivots stand in for
    pub cluster_size: usize,

    pub pivots: Vec<u32>,
}

/// Pivots of every cluster, in cluster order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotSet {
    pub entries: Vec<ClusterPivots>,
}

impl PivotSet {
    /// Total number of pivots
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.pivots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every pivot vertex, in cluster order
    pub fn pivots(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().flat_map(|e| e.pivots.iter().copied())
    }
}

fn ensure_members(cluster: &Cluster) -> Result<()> {
    if cluster.members.is_empty() {
        return Err(FastBcError::Selection { cluster: cluster.id });
    }
    Ok(())
}

/// Picks the top-ranked members of each cluster by degree or weight
#[derive(Debug, Clone, Copy)]
pub struct DegreePivotSelector {
    per_cluster: usize,
    signal: RankingSignal,
}

impl DegreePivotSelector {
    pub fn new(per_cluster: usize, signal: RankingSignal) -> Result<Self> {
        if per_cluster == 0 {
            return Err(FastBcError::Configuration(
                "at least one pivot per cluster is required".to_string(),
            ));
        }
        Ok(Self { per_cluster, signal })
    }
}

impl Default for DegreePivotSelector {
    fn default() -> Self {
        Self { per_cluster: 1, signal: RankingSignal::Degree }
    }
}

impl PivotSelector for DegreePivotSelector {
    fn select_pivots(&self, clusters: &ClusterSet, graph: &WeightedGraph) -> Result<PivotSet> {
        let entries = clusters
            .clusters
            .iter()
            .map(|cluster| {
                ensure_members(cluster)?;
                let pivots = rank_members(graph, &cluster.members, self.signal)
                    .into_iter()
                    .take(self.per_cluster)
                    .map(|strength| strength.vertex)
                    .collect();
                Ok(ClusterPivots { cluster: cluster.id, cluster_size: cluster.size, pivots })
            })
            .collect::<Result<Vec<_>>>()?;

        let set = PivotSet { entries };
        log::info!("Selected {} pivots for {} clusters", set.len(), clusters.len());
        Ok(set)
    }
}

/// Makes every vertex a pivot, which turns the pipeline into exact Brandes
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustivePivotSelector;

impl PivotSelector for ExhaustivePivotSelector {
    fn select_pivots(&self, clusters: &ClusterSet, _graph: &WeightedGraph) -> Result<PivotSet> {
        let entries = clusters
            .clusters
            .iter()
            .map(|cluster| {
                ensure_members(cluster)?;
                Ok(ClusterPivots {
                    cluster: cluster.id,
                    cluster_size: cluster.size,
                    pivots: cluster.members.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PivotSet { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{BoundaryClusterEvaluator, ClusterEvaluator};
    use crate::louvain::{Community, Partition};

    fn setup() -> (WeightedGraph, ClusterSet) {
        // 0 -> 1, 0 -> 2, 1 -> 2 in the first cluster; 3 -> 4 in the second; 5 alone
        let graph = WeightedGraph::from_adjacency(
            vec![vec![(1, 1.0), (2, 1.0)], vec![(2, 1.0)], vec![], vec![(4, 1.0)], vec![], vec![]],
            None,
        );
        let partition = Partition::from_membership(&[0, 0, 0, 1, 1, 2], 0.0, None, 1);
        let clusters = BoundaryClusterEvaluator.build_clusters(&graph, &partition).unwrap();
        (graph, clusters)
    }

    #[test]
    fn every_cluster_gets_a_pivot() {
        let (graph, clusters) = setup();
        let set = DegreePivotSelector::default().select_pivots(&clusters, &graph).unwrap();

        assert_eq!(set.entries.len(), 3);
        assert!(set.entries.iter().all(|e| !e.pivots.is_empty()));
        assert_eq!(set.pivots().collect::<Vec<_>>(), vec![0, 3, 5]);
    }

    #[test]
    fn multiple_pivots_are_capped_by_cluster_size() {
        let (graph, clusters) = setup();
        let selector = DegreePivotSelector::new(2, RankingSignal::Degree).unwrap();
        let set = selector.select_pivots(&clusters, &graph).unwrap();

        assert_eq!(set.entries[0].pivots, vec![0, 1]);
        assert_eq!(set.entries[1].pivots, vec![3, 4]);
        assert_eq!(set.entries[2].pivots, vec![5]);
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn selection_is_deterministic() {
        let (graph, clusters) = setup();
        let selector = DegreePivotSelector::new(1, RankingSignal::Weight).unwrap();
        assert_eq!(
            selector.select_pivots(&clusters, &graph).unwrap(),
            selector.select_pivots(&clusters, &graph).unwrap()
        );
    }

    #[test]
    fn exhaustive_uses_all_members() {
        let (graph, clusters) = setup();
        let set = ExhaustivePivotSelector.select_pivots(&clusters, &graph).unwrap();
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn empty_cluster_is_a_selection_error() {
        let graph = WeightedGraph::from_adjacency(vec![vec![]], None);
        let partition = Partition {
            communities: vec![
                Community { id: 0, members: vec![0], modularity: 0.0 },
                Community { id: 1, members: vec![], modularity: 0.0 },
            ],
            modularity: 0.0,
            seed: None,
            levels: 0,
        };
        let clusters = BoundaryClusterEvaluator.build_clusters(&graph, &partition).unwrap();

        let err = DegreePivotSelector::default().select_pivots(&clusters, &graph).unwrap_err();
        assert_eq!(err, FastBcError::Selection { cluster: 1 });
        assert!(err.is_internal());
        assert!(ExhaustivePivotSelector.select_pivots(&clusters, &graph).is_err());
    }

    #[test]
    fn zero_pivots_per_cluster_is_rejected() {
        assert!(matches!(
            DegreePivotSelector::new(0, RankingSignal::Degree),
            Err(FastBcError::Configuration(_))
        ));
    }
}
