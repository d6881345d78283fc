//! One level of the Louvain hierarchy: local moving and contraction
//!
//! A level works on an undirected weighted graph. Every directed input edge
//! u -> v of weight w becomes an undirected link of weight w; links appear in
//! the adjacency of both endpoints, self-loops appear once. With this layout
//! the weighted degree of a vertex is the plain sum of its adjacency list and
//! `total_weight` is 2m.

use crate::graph::WeightedGraph;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Undirected weighted graph handled by a single Louvain level
#[derive(Debug, Clone)]
pub struct LevelGraph {
    /// Symmetric `(neighbour, weight)` lists, sorted by neighbour
    adjacency: Vec<Vec<(u32, f64)>>,

    /// Weight of each vertex's self-loop (0 when absent)
    self_loops: Vec<f64>,

    /// Weighted degree of each vertex
    degrees: Vec<f64>,

    /// Sum of all weighted degrees (2m)
    total_weight: f64,
}

/// Result of optimizing one level
#[derive(Debug, Clone)]
pub struct LevelOutcome {
    /// Level vertex -> community, numbered 0..community_count by first appearance
    pub community: Vec<u32>,

    pub community_count: usize,

    /// Modularity of the level partition
    pub modularity: f64,

    /// Whether any vertex changed community
    pub moved: bool,

    /// Number of local-moving passes performed
    pub passes: usize,
}

impl LevelGraph {
    /// Symmetrise a directed graph into the first Louvain level
    pub fn from_directed(graph: &WeightedGraph) -> Self {
        let mut links: Vec<BTreeMap<u32, f64>> = vec![BTreeMap::new(); graph.node_count()];

        for (src, dst, w) in graph.edges() {
            *links[src as usize].entry(dst).or_insert(0.0) += w;
            if src != dst {
                *links[dst as usize].entry(src).or_insert(0.0) += w;
            }
        }

        Self::from_links(links)
    }

    fn from_links(links: Vec<BTreeMap<u32, f64>>) -> Self {
        let mut self_loops = vec![0.0; links.len()];
        let mut degrees = vec![0.0; links.len()];

        let adjacency: Vec<Vec<(u32, f64)>> = links
            .into_iter()
            .enumerate()
            .map(|(vertex, map)| {
                self_loops[vertex] = map.get(&(vertex as u32)).copied().unwrap_or(0.0);
                degrees[vertex] = map.values().sum();
                map.into_iter().collect()
            })
            .collect();

        let total_weight: f64 = degrees.iter().sum();

        Self { adjacency, self_loops, degrees, total_weight }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Contract each community into a single vertex.
    ///
    /// Links inside a community become the new vertex's self-loop (counted
    /// from both endpoints), links between communities are summed.
    pub fn aggregate(&self, community: &[u32], community_count: usize) -> Self {
        let mut links: Vec<BTreeMap<u32, f64>> = vec![BTreeMap::new(); community_count];

        for (vertex, neighbours) in self.adjacency.iter().enumerate() {
            let from = community[vertex];
            for &(nbr, w) in neighbours {
                *links[from as usize].entry(community[nbr as usize]).or_insert(0.0) += w;
            }
        }

        Self::from_links(links)
    }

    /// Modularity of an assignment of this level's vertices
    pub fn modularity(&self, membership: &[u32]) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }

        let slots = membership.iter().map(|&c| c as usize + 1).max().unwrap_or(0);
        let mut inside = vec![0.0; slots];
        let mut total = vec![0.0; slots];

        for (vertex, neighbours) in self.adjacency.iter().enumerate() {
            let c = membership[vertex] as usize;
            total[c] += self.degrees[vertex];
            for &(nbr, w) in neighbours {
                if membership[nbr as usize] as usize == c {
                    inside[c] += w;
                }
            }
        }

        community_modularity(&inside, &total, self.total_weight)
    }

    /// Greedy local moving until a pass gains no more than `precision`.
    ///
    /// Vertices are visited in an order shuffled by `rng`, so a run is
    /// reproducible from its seed.
    pub fn optimize(&self, rng: &mut ChaCha8Rng, precision: f64) -> LevelOutcome {
        let n = self.node_count();
        let m2 = self.total_weight;
        let mut community: Vec<u32> = (0..n as u32).collect();

        if m2 <= 0.0 {
            return LevelOutcome {
                community,
                community_count: n,
                modularity: 0.0,
                moved: false,
                passes: 0,
            };
        }

        let mut inside = self.self_loops.clone();
        let mut total = self.degrees.clone();

        let mut order: Vec<u32> = (0..n as u32).collect();
        order.shuffle(rng);

        // Scratch space for the weight from the current vertex to each neighbouring community
        let mut neigh_weight = vec![f64::NAN; n];
        let mut neigh_comms: Vec<u32> = Vec::new();

        let mut current = community_modularity(&inside, &total, m2);
        let mut moved = false;
        let mut passes = 0;

        loop {
            passes += 1;
            let mut moves = 0usize;

            for &node in &order {
                let node = node as usize;
                let node_comm = community[node];
                let degree = self.degrees[node];

                for &c in &neigh_comms {
                    neigh_weight[c as usize] = f64::NAN;
                }
                neigh_comms.clear();

                neigh_weight[node_comm as usize] = 0.0;
                neigh_comms.push(node_comm);
                for &(nbr, w) in &self.adjacency[node] {
                    if nbr as usize == node {
                        continue;
                    }
                    let c = community[nbr as usize];
                    if neigh_weight[c as usize].is_nan() {
                        neigh_weight[c as usize] = 0.0;
                        neigh_comms.push(c);
                    }
                    neigh_weight[c as usize] += w;
                }

                // Take the vertex out of its community
                total[node_comm as usize] -= degree;
                inside[node_comm as usize] -= 2.0 * neigh_weight[node_comm as usize] + self.self_loops[node];

                let mut best = node_comm;
                let mut best_gain = 0.0;
                for &c in &neigh_comms {
                    let gain = neigh_weight[c as usize] - total[c as usize] * degree / m2;
                    if gain > best_gain {
                        best = c;
                        best_gain = gain;
                    }
                }

                total[best as usize] += degree;
                inside[best as usize] += 2.0 * neigh_weight[best as usize] + self.self_loops[node];
                community[node] = best;

                if best != node_comm {
                    moves += 1;
                }
            }

            let next = community_modularity(&inside, &total, m2);
            let gain = next - current;
            current = next;

            log::trace!("Louvain pass {}: {} moves, modularity {:.6}", passes, moves, current);

            if moves > 0 {
                moved = true;
            }
            if moves == 0 || gain <= precision {
                break;
            }
        }

        let (community, community_count) = renumber(&community);

        LevelOutcome {
            community,
            community_count,
            modularity: current,
            moved,
            passes,
        }
    }
}

fn community_modularity(inside: &[f64], total: &[f64], m2: f64) -> f64 {
    inside
        .iter()
        .zip(total)
        .map(|(&i, &t)| i / m2 - (t / m2) * (t / m2))
        .sum()
}

/// Relabel communities 0..k in order of first appearance
fn renumber(community: &[u32]) -> (Vec<u32>, usize) {
    let mut mapping = vec![u32::MAX; community.len()];
    let mut next = 0u32;
    let relabelled = community
        .iter()
        .map(|&c| {
            let slot = &mut mapping[c as usize];
            if *slot == u32::MAX {
                *slot = next;
                next += 1;
            }
            *slot
        })
        .collect();
    (relabelled, next as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use rand::SeedableRng;

    fn two_triangles() -> WeightedGraph {
        let mut b = GraphBuilder::with_capacity(6);
        for (s, d) in [("a", "b"), ("b", "c"), ("c", "a"), ("d", "e"), ("e", "f"), ("f", "d"), ("c", "d")] {
            b.add_edge(s, d, 1.0);
        }
        b.build()
    }

    #[test]
    fn symmetrised_degrees_sum_to_twice_the_weight() {
        let level = LevelGraph::from_directed(&two_triangles());
        assert_eq!(level.node_count(), 6);
        assert!((level.total_weight() - 14.0).abs() < 1e-12);
    }

    #[test]
    fn optimize_separates_triangles() {
        let level = LevelGraph::from_directed(&two_triangles());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let outcome = level.optimize(&mut rng, 1e-6);

        assert!(outcome.moved);
        assert_eq!(outcome.community_count, 2);
        assert_eq!(outcome.community[0], outcome.community[1]);
        assert_eq!(outcome.community[1], outcome.community[2]);
        assert_eq!(outcome.community[3], outcome.community[4]);
        assert_ne!(outcome.community[0], outcome.community[3]);
        assert!((outcome.modularity - level.modularity(&outcome.community)).abs() < 1e-9);
    }

    #[test]
    fn aggregation_preserves_modularity() {
        let level = LevelGraph::from_directed(&two_triangles());
        let membership = vec![0, 0, 0, 1, 1, 1];
        let coarse = level.aggregate(&membership, 2);

        assert!((coarse.total_weight() - level.total_weight()).abs() < 1e-12);
        assert!((coarse.modularity(&[0, 1]) - level.modularity(&membership)).abs() < 1e-12);
    }

    #[test]
    fn edgeless_level_does_not_move() {
        let level = LevelGraph::from_directed(&WeightedGraph::from_adjacency(vec![vec![], vec![]], None));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = level.optimize(&mut rng, 0.0);

        assert!(!outcome.moved);
        assert_eq!(outcome.community_count, 2);
        assert_eq!(outcome.modularity, 0.0);
    }
}
