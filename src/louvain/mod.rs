//! Community detection by Louvain modularity optimization

pub mod evaluator;
pub mod level;

pub use evaluator::{LouvainEvaluator, SingleCommunityEvaluator};

use crate::error::{FastBcError, Result};
use crate::graph::WeightedGraph;
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// A cell of a vertex partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    /// Position of this community in its partition
    pub id: u32,

    /// Member vertex indices, sorted ascending
    pub members: Vec<u32>,

    /// Modularity of the partition this community belongs to
    pub modularity: f64,
}

/// A complete partition of the graph's vertices into communities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub communities: Vec<Community>,

    /// Newman modularity of the whole partition
    pub modularity: f64,

    /// Seed of the Louvain run that produced this partition
    pub seed: Option<u64>,

    /// Number of aggregation levels the run went through
    pub levels: usize,
}

impl Partition {
    /// Build a partition from a vertex -> community assignment.
    ///
    /// Communities are numbered by the smallest vertex they contain, so the
    /// same grouping always produces the same partition.
    pub fn from_membership(membership: &[u32], modularity: f64, seed: Option<u64>, levels: usize) -> Self {
        let mut renumber: HashMap<u32, u32> = HashMap::new();
        let mut communities: Vec<Community> = Vec::new();

        for (vertex, &label) in membership.iter().enumerate() {
            let id = *renumber.entry(label).or_insert_with(|| {
                communities.push(Community {
                    id: communities.len() as u32,
                    members: Vec::new(),
                    modularity,
                });
                communities.len() as u32 - 1
            });
            communities[id as usize].members.push(vertex as u32);
        }

        Self { communities, modularity, seed, levels }
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Vertex -> community id map; fails unless every vertex appears exactly once.
    pub fn membership(&self, vertex_count: usize) -> Result<Vec<u32>> {
        let mut membership: Vec<Option<u32>> = vec![None; vertex_count];

        for community in &self.communities {
            for &vertex in &community.members {
                let slot = membership.get_mut(vertex as usize).ok_or_else(|| {
                    FastBcError::InternalConsistency(format!(
                        "community {} references vertex {} outside a graph of {} vertices",
                        community.id, vertex, vertex_count
                    ))
                })?;
                if let Some(previous) = slot.replace(community.id) {
                    return Err(FastBcError::InternalConsistency(format!(
                        "vertex {} appears in communities {} and {}",
                        vertex, previous, community.id
                    )));
                }
            }
        }

        membership
            .into_iter()
            .enumerate()
            .map(|(vertex, slot)| {
                slot.ok_or_else(|| {
                    FastBcError::InternalConsistency(format!(
                        "vertex {} is not covered by the partition",
                        vertex
                    ))
                })
            })
            .collect()
    }

    /// Check that the communities cover every vertex exactly once
    pub fn validate(&self, vertex_count: usize) -> Result<()> {
        self.membership(vertex_count).map(|_| ())
    }
}

/// Strategy producing a vertex partition from a graph
pub trait CommunityEvaluator: Send + Sync {
    fn evaluate(&self, graph: &WeightedGraph) -> Result<Partition>;
}

/// Newman modularity of a vertex assignment on the symmetrised graph
pub fn modularity(graph: &WeightedGraph, membership: &[u32]) -> f64 {
    level::LevelGraph::from_directed(graph).modularity(membership)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_numbering_follows_smallest_vertex() {
        let p = Partition::from_membership(&[7, 3, 7, 3, 5], 0.25, Some(1), 1);

        assert_eq!(p.len(), 3);
        assert_eq!(p.communities[0].members, vec![0, 2]);
        assert_eq!(p.communities[1].members, vec![1, 3]);
        assert_eq!(p.communities[2].members, vec![4]);
        assert!(p.communities.iter().all(|c| c.modularity == 0.25));
        assert_eq!(p.membership(5).unwrap(), vec![0, 1, 0, 1, 2]);
    }

    #[test]
    fn validate_rejects_overlap_and_gaps() {
        let overlap = Partition {
            communities: vec![
                Community { id: 0, members: vec![0, 1], modularity: 0.0 },
                Community { id: 1, members: vec![1, 2], modularity: 0.0 },
            ],
            modularity: 0.0,
            seed: None,
            levels: 0,
        };
        assert!(matches!(overlap.validate(3), Err(FastBcError::InternalConsistency(_))));

        let gap = Partition {
            communities: vec![Community { id: 0, members: vec![0, 2], modularity: 0.0 }],
            modularity: 0.0,
            seed: None,
            levels: 0,
        };
        assert!(matches!(gap.validate(3), Err(FastBcError::InternalConsistency(_))));
        assert!(matches!(gap.validate(2), Err(FastBcError::InternalConsistency(_))));
    }
}
