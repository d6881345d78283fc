//! Cluster statistics and per-vertex structural signals

use crate::graph::WeightedGraph;
use serde::{Serialize, Deserialize};
use std::cmp::Ordering;

/// Structural signal used to rank vertices inside a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankingSignal {
    /// In-degree plus out-degree, ties broken by total weight
    #[default]
    Degree,

    /// In-weight plus out-weight, ties broken by degree
    Weight,
}

/// Degree and weight of a vertex, counting both directions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexStrength {
    pub vertex: u32,
    pub degree: usize,
    pub weight: f64,
}

impl VertexStrength {
    pub fn of(graph: &WeightedGraph, vertex: u32) -> Self {
        Self {
            vertex,
            degree: graph.in_degree(vertex) + graph.out_degree(vertex),
            weight: graph.in_weight(vertex) + graph.out_weight(vertex),
        }
    }

    /// Ordering with the strongest vertex first; the lowest index wins exact ties
    pub fn rank(&self, other: &Self, signal: RankingSignal) -> Ordering {
        let by_degree = other.degree.cmp(&self.degree);
        let by_weight = other.weight.total_cmp(&self.weight);
        let primary = match signal {
            RankingSignal::Degree => by_degree.then(by_weight),
            RankingSignal::Weight => by_weight.then(by_degree),
        };
        primary.then(self.vertex.cmp(&other.vertex))
    }
}

/// Rank cluster members from strongest to weakest
pub fn rank_members(graph: &WeightedGraph, members: &[u32], signal: RankingSignal) -> Vec<VertexStrength> {
    let mut strengths: Vec<VertexStrength> = members
        .iter()
        .map(|&vertex| VertexStrength::of(graph, vertex))
        .collect();
    strengths.sort_by(|a, b| a.rank(b, signal));
    strengths
}

/// Calculate density (internal edges / potential edges)
pub fn calculate_density(internal_edges: usize, size: usize) -> f32 {
    if size <= 1 {
        return 1.0; // By convention, singleton clusters have density 1
    }

    // Potential edges = n * (n - 1) for a directed graph
    let potential_edges = size * (size - 1);
    internal_edges as f32 / potential_edges as f32
}
