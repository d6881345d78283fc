//! Memory-efficient weighted graph representation

use std::mem;
use serde::{Serialize, Deserialize};

/// Compressed sparse representation of a weighted directed graph.
///
/// Forward and reverse adjacency are both stored so that in-degree and
/// in-weight lookups stay O(1). Adjacency lists are sorted by neighbour index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightedGraph {
    /// Number of vertices in the graph
    pub node_count: usize,

    /// offsets[i] to offsets[i+1] defines the outgoing edge range for vertex i
    pub offsets: Vec<u32>,

    /// Concatenated lists of edge targets
    pub targets: Vec<u32>,

    /// Edge weights, aligned with `targets`
    pub weights: Vec<f64>,

    /// Reverse offsets: incoming edge range for each vertex
    pub in_offsets: Vec<u32>,

    /// Concatenated lists of edge sources, grouped by target
    pub sources: Vec<u32>,

    /// Edge weights, aligned with `sources`
    pub in_weights: Vec<f64>,

    /// Optional mapping from vertex index to the token used in the input
    pub node_ids: Option<Vec<String>>,
}

impl WeightedGraph {
    /// Build a graph from per-vertex sorted adjacency lists.
    ///
    /// Each list must hold `(target, weight)` pairs with distinct targets.
    pub fn from_adjacency(adjacency: Vec<Vec<(u32, f64)>>, node_ids: Option<Vec<String>>) -> Self {
        let node_count = adjacency.len();
        let edge_count: usize = adjacency.iter().map(|list| list.len()).sum();

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut targets = Vec::with_capacity(edge_count);
        let mut weights = Vec::with_capacity(edge_count);
        let mut in_counts = vec![0u32; node_count];

        offsets.push(0);
        for list in &adjacency {
            for &(dst, w) in list {
                targets.push(dst);
                weights.push(w);
                in_counts[dst as usize] += 1;
            }
            offsets.push(targets.len() as u32);
        }

        let mut in_offsets = Vec::with_capacity(node_count + 1);
        in_offsets.push(0);
        let mut offset = 0;
        for &count in &in_counts {
            offset += count;
            in_offsets.push(offset);
        }

        // Sources are visited in increasing order, so each incoming list ends up sorted
        let mut sources = vec![0u32; edge_count];
        let mut in_weights = vec![0.0; edge_count];
        let mut current_pos = vec![0usize; node_count];
        for (src, list) in adjacency.iter().enumerate() {
            for &(dst, w) in list {
                let dst = dst as usize;
                let pos = in_offsets[dst] as usize + current_pos[dst];
                sources[pos] = src as u32;
                in_weights[pos] = w;
                current_pos[dst] += 1;
            }
        }

        Self {
            node_count,
            offsets,
            targets,
            weights,
            in_offsets,
            sources,
            in_weights,
            node_ids,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    /// Vertex indices in stable enumeration order
    pub fn vertices(&self) -> impl DoubleEndedIterator<Item = u32> {
        0..self.node_count as u32
    }

    /// Outgoing `(targets, weights)` of a vertex
    pub fn outgoing(&self, node: u32) -> (&[u32], &[f64]) {
        let start = self.offsets[node as usize] as usize;
        let end = self.offsets[node as usize + 1] as usize;
        (&self.targets[start..end], &self.weights[start..end])
    }

    /// Incoming `(sources, weights)` of a vertex
    pub fn incoming(&self, node: u32) -> (&[u32], &[f64]) {
        let start = self.in_offsets[node as usize] as usize;
        let end = self.in_offsets[node as usize + 1] as usize;
        (&self.sources[start..end], &self.in_weights[start..end])
    }

    /// Iterate every edge as `(source, target, weight)`
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        self.vertices().flat_map(move |src| {
            let (targets, weights) = self.outgoing(src);
            targets.iter().zip(weights).map(move |(&dst, &w)| (src, dst, w))
        })
    }

    /// Weight of the edge from src to dst, if present
    pub fn edge_weight(&self, src: u32, dst: u32) -> Option<f64> {
        let (targets, weights) = self.outgoing(src);
        targets.binary_search(&dst).ok().map(|pos| weights[pos])
    }

    pub fn has_edge(&self, src: u32, dst: u32) -> bool {
        self.edge_weight(src, dst).is_some()
    }

    pub fn out_degree(&self, node: u32) -> usize {
        self.outgoing(node).0.len()
    }

    pub fn in_degree(&self, node: u32) -> usize {
        self.incoming(node).0.len()
    }

    /// Sum of outgoing edge weights
    pub fn out_weight(&self, node: u32) -> f64 {
        self.outgoing(node).1.iter().sum()
    }

    /// Sum of incoming edge weights
    pub fn in_weight(&self, node: u32) -> f64 {
        self.incoming(node).1.iter().sum()
    }

    /// Token the loader read for this vertex, or its index when tokens were not kept
    pub fn label(&self, node: u32) -> String {
        self.node_ids
            .as_ref()
            .and_then(|ids| ids.get(node as usize).cloned())
            .unwrap_or_else(|| node.to_string())
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = (self.offsets.capacity() + self.in_offsets.capacity()) * mem::size_of::<u32>();
        let endpoints = (self.targets.capacity() + self.sources.capacity()) * mem::size_of::<u32>();
        let weights = (self.weights.capacity() + self.in_weights.capacity()) * mem::size_of::<f64>();

        let ids = self.node_ids.as_ref()
            .map(|ids| ids.iter().map(|s| s.capacity()).sum::<usize>())
            .unwrap_or(0);

        base + offsets + endpoints + weights + ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeightedGraph {
        // 0 -> 1 (1.0), 0 -> 2 (3.0), 1 -> 2 (1.0)
        WeightedGraph::from_adjacency(
            vec![vec![(1, 1.0), (2, 3.0)], vec![(2, 1.0)], vec![]],
            None,
        )
    }

    #[test]
    fn forward_and_reverse_adjacency_agree() {
        let g = sample();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.outgoing(0).0, &[1, 2]);
        assert_eq!(g.incoming(2).0, &[0, 1]);
        assert_eq!(g.incoming(2).1, &[3.0, 1.0]);
        assert_eq!(g.in_degree(0), 0);
        assert_eq!(g.out_degree(2), 0);
    }

    #[test]
    fn weight_lookup_and_sums() {
        let g = sample();
        assert_eq!(g.edge_weight(0, 2), Some(3.0));
        assert_eq!(g.edge_weight(2, 0), None);
        assert!(g.has_edge(1, 2));
        assert_eq!(g.out_weight(0), 4.0);
        assert_eq!(g.in_weight(2), 4.0);
    }

    #[test]
    fn edges_iterate_in_source_order() {
        let g = sample();
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges, vec![(0, 1, 1.0), (0, 2, 3.0), (1, 2, 1.0)]);
        assert_eq!(g.label(1), "1");
    }
}
