//! Single-source Brandes accumulation over weighted shortest paths
//!
//! Phase 1 runs Dijkstra from the source for distances, then orders the
//! settled vertices so that every shortest-path predecessor comes before its
//! successor, and counts shortest paths (sigma) in that order while keeping
//! every tied predecessor. Phase 2 walks the order backwards and propagates
//! dependencies along the predecessor lists.
//!
//! Vertices at the same distance can feed each other through zero-weight
//! edges, so each tier of equal distance is ordered topologically over those
//! edges. Inside a zero-weight cycle the vertex settled first is taken as the
//! entry point: the cycle edges leading back into it are not shortest-path
//! steps, which keeps every counted path simple and sigma finite.

use crate::brandes::SingleSourceBc;
use crate::graph::WeightedGraph;
use ndarray::Array1;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Relative tolerance under which two path lengths count as equal
const TIE_EPSILON: f64 = 1e-12;

/// Marks a vertex with no position in the current order or tier
const UNPLACED: usize = usize::MAX;

/// Priority queue entry, ordered so that the smallest distance pops first
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    distance: f64,
    vertex: u32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Scratch memory for one single-source computation.
///
/// A workspace is private to the task using it. Between sources it is reset
/// only over the vertices the previous search reached.
#[derive(Debug, Clone)]
pub struct SsspWorkspace {
    distance: Vec<f64>,
    sigma: Vec<f64>,
    delta: Vec<f64>,
    predecessors: Vec<Vec<u32>>,
    settled: Vec<bool>,
    /// Index of each vertex in `order`
    position: Vec<usize>,
    /// Index of each vertex inside the tier being ordered
    tier_rank: Vec<usize>,
    /// Vertices in Dijkstra settle order (non-decreasing distance)
    settle_order: Vec<u32>,
    /// Settle order with equal-distance tiers rearranged so predecessors come first
    order: Vec<u32>,
    heap: BinaryHeap<QueueEntry>,
}

impl SsspWorkspace {
    pub fn new(node_count: usize) -> Self {
        Self {
            distance: vec![f64::INFINITY; node_count],
            sigma: vec![0.0; node_count],
            delta: vec![0.0; node_count],
            predecessors: vec![Vec::new(); node_count],
            settled: vec![false; node_count],
            position: vec![UNPLACED; node_count],
            tier_rank: vec![UNPLACED; node_count],
            settle_order: Vec::new(),
            order: Vec::new(),
            heap: BinaryHeap::new(),
        }
    }

    fn reset(&mut self) {
        for &v in &self.settle_order {
            let v = v as usize;
            self.distance[v] = f64::INFINITY;
            self.sigma[v] = 0.0;
            self.delta[v] = 0.0;
            self.predecessors[v].clear();
            self.settled[v] = false;
            self.position[v] = UNPLACED;
        }
        self.settle_order.clear();
        self.order.clear();
        self.heap.clear();
    }

    /// Whether `u -> v` with `weight` lies on a shortest path to `v`
    fn is_tight(&self, u: usize, v: usize, weight: f64) -> bool {
        is_tie(self.distance[u] + weight, self.distance[v])
    }
}

fn is_tie(a: f64, b: f64) -> bool {
    (a - b).abs() <= TIE_EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Dijkstra-based single-source Brandes accumulator
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraBrandes;

impl DijkstraBrandes {
    /// Phase 1: distances, path counts and predecessor lists from `source`
    pub fn search(&self, graph: &WeightedGraph, source: u32, ws: &mut SsspWorkspace) {
        ws.reset();

        let s = source as usize;
        ws.distance[s] = 0.0;
        ws.heap.push(QueueEntry { distance: 0.0, vertex: source });

        while let Some(QueueEntry { distance, vertex }) = ws.heap.pop() {
            let v = vertex as usize;
            if ws.settled[v] || distance > ws.distance[v] {
                continue;
            }
            ws.settled[v] = true;
            ws.settle_order.push(vertex);

            let (targets, weights) = graph.outgoing(vertex);
            for (&w_vertex, &weight) in targets.iter().zip(weights) {
                let w = w_vertex as usize;
                let candidate = distance + weight;
                if !ws.settled[w] && candidate < ws.distance[w] {
                    ws.distance[w] = candidate;
                    ws.heap.push(QueueEntry { distance: candidate, vertex: w_vertex });
                }
            }
        }

        let mut start = 0;
        while start < ws.settle_order.len() {
            let base = ws.distance[ws.settle_order[start] as usize];
            let mut end = start + 1;
            while end < ws.settle_order.len() && is_tie(ws.distance[ws.settle_order[end] as usize], base) {
                end += 1;
            }
            self.order_tier(graph, source, start, end, ws);
            start = end;
        }

        ws.sigma[s] = 1.0;
        for i in 0..ws.order.len() {
            let v_vertex = ws.order[i];
            if v_vertex == source {
                continue;
            }
            let v = v_vertex as usize;
            let (sources, weights) = graph.incoming(v_vertex);
            for (&u_vertex, &weight) in sources.iter().zip(weights) {
                let u = u_vertex as usize;
                if ws.position[u] < i && ws.is_tight(u, v, weight) {
                    ws.sigma[v] += ws.sigma[u];
                    ws.predecessors[v].push(u_vertex);
                }
            }
        }
    }

    /// Append `settle_order[start..end]`, one tier of equal distance, to the
    /// final order so that tight edges inside the tier point forward.
    ///
    /// Kahn's algorithm over the tight intra-tier edges, preferring settle
    /// order. When only cycles remain, the earliest settled vertex left is
    /// placed and its remaining incoming cycle edges are dropped.
    fn order_tier(&self, graph: &WeightedGraph, source: u32, start: usize, end: usize, ws: &mut SsspWorkspace) {
        let len = end - start;
        if len == 1 {
            let v = ws.settle_order[start];
            ws.position[v as usize] = ws.order.len();
            ws.order.push(v);
            return;
        }

        for rank in 0..len {
            let v = ws.settle_order[start + rank] as usize;
            ws.tier_rank[v] = rank;
        }

        let mut indegree = vec![0usize; len];
        for rank in 0..len {
            let v_vertex = ws.settle_order[start + rank];
            if v_vertex == source {
                continue;
            }
            let v = v_vertex as usize;
            let (sources, weights) = graph.incoming(v_vertex);
            for (&u_vertex, &weight) in sources.iter().zip(weights) {
                let u = u_vertex as usize;
                if u != v && ws.tier_rank[u] != UNPLACED && ws.is_tight(u, v, weight) {
                    indegree[rank] += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..len)
            .filter(|&rank| indegree[rank] == 0)
            .map(Reverse)
            .collect();
        let mut placed = vec![false; len];
        let mut placed_count = 0;
        let mut cycle_cursor = 0;

        while placed_count < len {
            let rank = match ready.pop() {
                Some(Reverse(rank)) if placed[rank] => continue,
                Some(Reverse(rank)) => rank,
                None => {
                    while placed[cycle_cursor] {
                        cycle_cursor += 1;
                    }
                    cycle_cursor
                }
            };
            placed[rank] = true;
            placed_count += 1;

            let v_vertex = ws.settle_order[start + rank];
            let v = v_vertex as usize;
            ws.position[v] = ws.order.len();
            ws.order.push(v_vertex);

            let (targets, weights) = graph.outgoing(v_vertex);
            for (&x_vertex, &weight) in targets.iter().zip(weights) {
                let x = x_vertex as usize;
                if x == v || x_vertex == source {
                    continue;
                }
                let x_rank = ws.tier_rank[x];
                if x_rank != UNPLACED && !placed[x_rank] && ws.is_tight(v, x, weight) {
                    indegree[x_rank] -= 1;
                    if indegree[x_rank] == 0 {
                        ready.push(Reverse(x_rank));
                    }
                }
            }
        }

        for rank in 0..len {
            let v = ws.settle_order[start + rank] as usize;
            ws.tier_rank[v] = UNPLACED;
        }
    }

    /// Phase 2: back-propagate dependencies and add `factor` times them into `out`
    pub fn accumulate_with(
        &self,
        graph: &WeightedGraph,
        source: u32,
        factor: f64,
        ws: &mut SsspWorkspace,
        out: &mut Array1<f64>,
    ) {
        self.search(graph, source, ws);

        for &w_vertex in ws.order.iter().rev() {
            let w = w_vertex as usize;
            let coefficient = (1.0 + ws.delta[w]) / ws.sigma[w];
            for &v in &ws.predecessors[w] {
                let v = v as usize;
                ws.delta[v] += ws.sigma[v] * coefficient;
            }
            if w_vertex != source {
                out[w] += factor * ws.delta[w];
            }
        }
    }
}

impl SingleSourceBc for DijkstraBrandes {
    fn accumulate_from(&self, graph: &WeightedGraph, source: u32) -> Array1<f64> {
        let mut out = Array1::zeros(graph.node_count());
        self.accumulate_into(graph, source, 1.0, &mut out);
        out
    }

    fn accumulate_into(&self, graph: &WeightedGraph, source: u32, factor: f64, out: &mut Array1<f64>) {
        let mut ws = SsspWorkspace::new(graph.node_count());
        self.accumulate_with(graph, source, factor, &mut ws, out);
    }

    fn accumulate_batch(&self, graph: &WeightedGraph, jobs: &[(u32, f64)], out: &mut Array1<f64>) {
        let mut ws = SsspWorkspace::new(graph.node_count());
        for &(source, factor) in jobs {
            self.accumulate_with(graph, source, factor, &mut ws, out);
        }
    }
}

/// Shortest-path structure rooted at one source
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    /// Distance from the source; infinite when unreachable
    pub distance: Vec<f64>,

    /// Number of distinct shortest paths from the source
    pub sigma: Vec<f64>,

    /// Predecessors on shortest paths, as vertex indices
    pub predecessors: Vec<Vec<u32>>,
}

pub fn shortest_paths(graph: &WeightedGraph, source: u32) -> ShortestPaths {
    let mut ws = SsspWorkspace::new(graph.node_count());
    DijkstraBrandes.search(graph, source, &mut ws);
    ShortestPaths {
        distance: ws.distance,
        sigma: ws.sigma,
        predecessors: ws.predecessors,
    }
}
