//! Cluster construction from a Louvain partition

use crate::cluster::metrics::calculate_density;
use crate::cluster::{Cluster, ClusterEvaluator, ClusterSet};
use crate::error::{FastBcError, Result};
use crate::graph::WeightedGraph;
use crate::louvain::Partition;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Builds clusters with their border vertices and cross-edge weights
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryClusterEvaluator;

impl ClusterEvaluator for BoundaryClusterEvaluator {
    fn build_clusters(&self, graph: &WeightedGraph, partition: &Partition) -> Result<ClusterSet> {
        let membership = cluster_membership(graph.node_count(), partition)?;

        log::info!("Building {} clusters", partition.len());

        let clusters: Vec<Cluster> = partition
            .communities
            .par_iter()
            .enumerate()
            .map(|(id, community)| build_cluster(graph, &membership, id as u32, &community.members))
            .collect();

        let singletons = clusters.iter().filter(|c| c.is_singleton()).count();
        let border_vertices: usize = clusters.iter().map(|c| c.border.len()).sum();
        log::debug!(
            "Built {} clusters ({} singletons, {} border vertices)",
            clusters.len(),
            singletons,
            border_vertices
        );

        Ok(ClusterSet { clusters, membership })
    }
}

/// Map each vertex to the position of its community, checking coverage
fn cluster_membership(vertex_count: usize, partition: &Partition) -> Result<Vec<u32>> {
    let mut membership = vec![u32::MAX; vertex_count];

    for (id, community) in partition.communities.iter().enumerate() {
        for &vertex in &community.members {
            match membership.get_mut(vertex as usize) {
                None => {
                    return Err(FastBcError::InternalConsistency(format!(
                        "community {} references unknown vertex {}",
                        id, vertex
                    )))
                }
                Some(slot) if *slot != u32::MAX => {
                    return Err(FastBcError::InternalConsistency(format!(
                        "vertex {} belongs to communities {} and {}",
                        vertex, *slot, id
                    )))
                }
                Some(slot) => *slot = id as u32,
            }
        }
    }

    if let Some(vertex) = membership.iter().position(|&id| id == u32::MAX) {
        return Err(FastBcError::InternalConsistency(format!(
            "vertex {} is not covered by any community",
            vertex
        )));
    }

    Ok(membership)
}

fn build_cluster(graph: &WeightedGraph, membership: &[u32], id: u32, members: &[u32]) -> Cluster {
    let mut members = members.to_vec();
    members.sort_unstable();

    let mut border = Vec::new();
    let mut internal_edges = 0usize;
    let mut internal_weight = 0.0;
    let mut outgoing_weight = 0.0;
    let mut incoming_weight = 0.0;
    let mut neighbors: BTreeMap<u32, f64> = BTreeMap::new();

    for &vertex in &members {
        let mut crosses = false;

        let (targets, weights) = graph.outgoing(vertex);
        for (&dst, &w) in targets.iter().zip(weights) {
            let other = membership[dst as usize];
            if other == id {
                internal_edges += 1;
                internal_weight += w;
            } else {
                crosses = true;
                outgoing_weight += w;
                *neighbors.entry(other).or_insert(0.0) += w;
            }
        }

        let (sources, weights) = graph.incoming(vertex);
        for (&src, &w) in sources.iter().zip(weights) {
            if membership[src as usize] != id {
                crosses = true;
                incoming_weight += w;
            }
        }

        if crosses {
            border.push(vertex);
        }
    }

    let size = members.len();
    Cluster {
        id,
        size,
        border,
        internal_weight,
        outgoing_weight,
        incoming_weight,
        neighbors: neighbors.into_iter().collect(),
        density: calculate_density(internal_edges, size),
        members,
    }
}
