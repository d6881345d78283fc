//! Parallel multi-seed Louvain evaluation

use crate::error::{FastBcError, Result};
use crate::graph::WeightedGraph;
use crate::louvain::level::LevelGraph;
use crate::louvain::{CommunityEvaluator, Partition};
use itertools::Itertools;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashSet;

/// Runs one Louvain optimization per seed and keeps the best partition
#[derive(Debug, Clone)]
pub struct LouvainEvaluator {
    /// One seed per executor, ascending; the lowest seed wins modularity ties
    seeds: Vec<u64>,

    /// Minimum modularity gain for another pass or level
    precision: f64,
}

impl LouvainEvaluator {
    /// Create an evaluator, validating seeds against the executor count.
    ///
    /// Seeds form a set: the order they are given in has no effect on the result.
    pub fn new(mut seeds: Vec<u64>, executors: usize, precision: f64) -> Result<Self> {
        if executors == 0 {
            return Err(FastBcError::Configuration(
                "at least one Louvain executor is required".to_string(),
            ));
        }
        if seeds.len() != executors {
            return Err(FastBcError::Configuration(format!(
                "{} Louvain seeds given for {} executors",
                seeds.len(),
                executors
            )));
        }
        let mut seen = HashSet::with_capacity(seeds.len());
        if let Some(duplicate) = seeds.iter().find(|&&seed| !seen.insert(seed)) {
            return Err(FastBcError::Configuration(format!(
                "duplicate Louvain seed {}, each seed must be unique",
                duplicate
            )));
        }
        if !precision.is_finite() || precision < 0.0 {
            return Err(FastBcError::Configuration(format!(
                "Louvain precision must be a non-negative number, got {}",
                precision
            )));
        }

        seeds.sort_unstable();
        Ok(Self { seeds, precision })
    }

    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Run every seeded optimization, returning the candidates in ascending seed order
    pub fn candidates(&self, graph: &WeightedGraph) -> Vec<Partition> {
        log::info!(
            "Running {} Louvain executors with seeds [{}]",
            self.seeds.len(),
            self.seeds.iter().join(", ")
        );

        self.seeds
            .par_iter()
            .map(|&seed| run_louvain(graph, seed, self.precision))
            .collect()
    }
}

impl CommunityEvaluator for LouvainEvaluator {
    fn evaluate(&self, graph: &WeightedGraph) -> Result<Partition> {
        let best = select_best(self.candidates(graph)).ok_or_else(|| {
            FastBcError::InternalConsistency("Louvain produced no candidate partition".to_string())
        })?;

        log::info!(
            "Selected Louvain partition from seed {:?}: {} communities, modularity {:.6}",
            best.seed,
            best.len(),
            best.modularity
        );

        Ok(best)
    }
}

/// Pick the partition with the strictly highest modularity; earlier candidates win ties,
/// which with ascending seeds means the lowest seed.
pub fn select_best(candidates: Vec<Partition>) -> Option<Partition> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.modularity <= current.modularity => Some(current),
        _ => Some(candidate),
    })
}

/// A single seeded multi-level Louvain optimization
pub fn run_louvain(graph: &WeightedGraph, seed: u64, precision: f64) -> Partition {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut level = LevelGraph::from_directed(graph);
    let mut membership: Vec<u32> = (0..graph.node_count() as u32).collect();
    let mut modularity = level.modularity(&membership);
    let mut levels = 0;

    loop {
        let outcome = level.optimize(&mut rng, precision);
        if !outcome.moved || outcome.community_count >= level.node_count() {
            break;
        }

        for label in membership.iter_mut() {
            *label = outcome.community[*label as usize];
        }
        let gain = outcome.modularity - modularity;
        modularity = outcome.modularity;
        levels += 1;

        log::debug!(
            "Seed {} level {}: {} communities after {} passes, modularity {:.6}",
            seed,
            levels,
            outcome.community_count,
            outcome.passes,
            modularity
        );

        if gain <= precision {
            break;
        }
        level = level.aggregate(&outcome.community, outcome.community_count);
    }

    log::debug!("Seed {} converged after {} levels, modularity {:.6}", seed, levels, modularity);

    Partition::from_membership(&membership, modularity, Some(seed), levels)
}

/// Places every vertex in one community, so pivots range over the whole graph
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCommunityEvaluator;

impl CommunityEvaluator for SingleCommunityEvaluator {
    fn evaluate(&self, graph: &WeightedGraph) -> Result<Partition> {
        let membership = vec![0u32; graph.node_count()];
        let modularity = crate::louvain::modularity(graph, &membership);
        Ok(Partition::from_membership(&membership, modularity, None, 0))
    }
}
