//! Graph construction module

use crate::graph::WeightedGraph;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Builder for incrementally constructing a WeightedGraph
pub struct GraphBuilder {
    /// Mapping from string IDs to vertex indices
    id_to_index: HashMap<String, u32>,

    /// Vertex string IDs, in first-appearance order
    node_ids: Vec<String>,

    /// Adjacency lists for each vertex
    adjacency_lists: Vec<Vec<(u32, f64)>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Get or create a vertex index for the given string ID
    pub fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.adjacency_lists.push(Vec::new());

        idx
    }

    /// Add a weighted edge between two string IDs
    pub fn add_edge(&mut self, src_id: &str, dst_id: &str, weight: f64) {
        let src_idx = self.get_or_create_node(src_id);
        let dst_idx = self.get_or_create_node(dst_id);
        self.add_indexed_edge(src_idx, dst_idx, weight);
    }

    /// Add a weighted edge between two existing vertex indices
    pub fn add_indexed_edge(&mut self, src: u32, dst: u32, weight: f64) {
        self.adjacency_lists[src as usize].push((dst, weight));
    }

    /// Build the compressed graph.
    ///
    /// Parallel edges collapse into one edge carrying the smallest weight, the
    /// only one a shortest path can ever use.
    pub fn build(mut self) -> WeightedGraph {
        for list in &mut self.adjacency_lists {
            list.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
            list.dedup_by_key(|&mut (dst, _)| dst);
        }

        WeightedGraph::from_adjacency(self.adjacency_lists, Some(self.node_ids))
    }
}

impl<N> From<&DiGraph<N, f64>> for WeightedGraph {
    fn from(graph: &DiGraph<N, f64>) -> Self {
        let mut builder = GraphBuilder::with_capacity(graph.node_count());
        for node in graph.node_indices() {
            builder.get_or_create_node(&node.index().to_string());
        }
        for edge in graph.edge_references() {
            builder.add_indexed_edge(
                edge.source().index() as u32,
                edge.target().index() as u32,
                *edge.weight(),
            );
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_first_appearance() {
        let mut builder = GraphBuilder::with_capacity(4);
        builder.add_edge("x", "y", 2.0);
        builder.add_edge("z", "x", 1.0);
        let g = builder.build();

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.node_ids.as_deref(), Some(&["x".to_string(), "y".to_string(), "z".to_string()][..]));
        assert_eq!(g.edge_weight(2, 0), Some(1.0));
        assert_eq!(g.label(1), "y");
    }

    #[test]
    fn parallel_edges_keep_minimum_weight() {
        let mut builder = GraphBuilder::with_capacity(2);
        builder.add_edge("a", "b", 5.0);
        builder.add_edge("a", "b", 2.0);
        builder.add_edge("a", "b", 7.0);
        let g = builder.build();

        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_weight(0, 1), Some(2.0));
    }

    #[test]
    fn converts_from_petgraph() {
        let mut pg: DiGraph<(), f64> = DiGraph::new();
        let a = pg.add_node(());
        let b = pg.add_node(());
        let c = pg.add_node(());
        pg.add_edge(a, b, 1.5);
        pg.add_edge(b, c, 0.5);

        let g = WeightedGraph::from(&pg);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_weight(0, 1), Some(1.5));
        assert_eq!(g.edge_weight(1, 2), Some(0.5));
    }
}
