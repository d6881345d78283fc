//! Configuration management for the betweenness engine

use crate::brandes::{
    ClusterSizeScaling, ClusteredBrandesBc, DegreePivotSelector, ExhaustivePivotSelector, UnitScaling,
};
use crate::cluster::metrics::RankingSignal;
use crate::error::{FastBcError, Result};
use crate::louvain::{LouvainEvaluator, SingleCommunityEvaluator};
use log::LevelFilter;
use rand::Rng;
use std::collections::HashSet;
use std::str::FromStr;

/// Default number of parallel Louvain executors
pub const DEFAULT_EXECUTORS: usize = 4;

/// Default minimum modularity gain
pub const DEFAULT_PRECISION: f64 = 0.01;

/// Settings of one betweenness computation
#[derive(Debug, Clone)]
pub struct Config {
    /// One Louvain seed per executor
    pub seeds: Vec<u64>,

    /// Number of parallel Louvain executors
    pub executors: usize,

    /// Minimum modularity gain for Louvain to keep iterating
    pub precision: f64,

    /// Pivots taken from each cluster
    pub pivots_per_cluster: usize,

    /// Structural signal ranking pivot candidates
    pub ranking: RankingSignal,

    /// Use every vertex as a source instead of clustering
    pub exact: bool,

    /// Pivots handled by each accumulation task
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            executors: DEFAULT_EXECUTORS,
            precision: DEFAULT_PRECISION,
            pivots_per_cluster: 1,
            ranking: RankingSignal::Degree,
            exact: false,
            chunk_size: crate::brandes::clustered::DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Create a configuration for the given seeds, one executor per seed
    pub fn new(seeds: Vec<u64>, precision: f64) -> Self {
        Self {
            executors: seeds.len(),
            seeds,
            precision,
            ..Self::default()
        }
    }

    /// Check every setting before any work starts
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FastBcError::Configuration("chunk size must be positive".to_string()));
        }
        if self.exact {
            return Ok(());
        }
        LouvainEvaluator::new(self.seeds.clone(), self.executors, self.precision)?;
        DegreePivotSelector::new(self.pivots_per_cluster, self.ranking)?;
        Ok(())
    }

    /// Assemble the pipeline described by this configuration
    pub fn build_engine(&self) -> Result<ClusteredBrandesBc> {
        self.validate()?;

        let engine = if self.exact {
            ClusteredBrandesBc::new(Box::new(SingleCommunityEvaluator))
                .with_pivot_selector(Box::new(ExhaustivePivotSelector))
                .with_scaling(Box::new(UnitScaling))
        } else {
            let louvain = LouvainEvaluator::new(self.seeds.clone(), self.executors, self.precision)?;
            let pivots = DegreePivotSelector::new(self.pivots_per_cluster, self.ranking)?;
            ClusteredBrandesBc::new(Box::new(louvain))
                .with_pivot_selector(Box::new(pivots))
                .with_scaling(Box::new(ClusterSizeScaling))
        };

        Ok(engine.with_chunk_size(self.chunk_size))
    }
}

/// Parse a comma or whitespace separated seed list, rejecting duplicates
pub fn parse_seeds(list: &str) -> Result<Vec<u64>> {
    let mut seen = HashSet::new();
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let seed: u64 = token.parse().map_err(|_| {
                FastBcError::Configuration(format!("invalid Louvain seed '{}'", token))
            })?;
            if !seen.insert(seed) {
                return Err(FastBcError::Configuration(format!(
                    "duplicate Louvain seed {}, each seed must be unique",
                    seed
                )));
            }
            Ok(seed)
        })
        .collect()
}

/// Work out the seeds and executor count from the command line.
///
/// Explicit seeds require an explicit executor count of the same size. Without
/// seeds, one distinct random seed is drawn per executor.
pub fn resolve_seeds(seeds: Option<&str>, executors: Option<usize>) -> Result<(Vec<u64>, usize)> {
    match seeds {
        Some(list) => {
            let executors = executors.ok_or_else(|| {
                FastBcError::Configuration(
                    "Louvain executors count must be set to allow executor seeds to be set".to_string(),
                )
            })?;
            let seeds = parse_seeds(list)?;
            if seeds.len() != executors {
                return Err(FastBcError::Configuration(format!(
                    "Louvain seeds count ({}) is different from executors count ({})",
                    seeds.len(),
                    executors
                )));
            }
            Ok((seeds, executors))
        }
        None => {
            let executors = executors.unwrap_or(DEFAULT_EXECUTORS);
            if executors == 0 {
                return Err(FastBcError::Configuration(
                    "at least one Louvain executor is required".to_string(),
                ));
            }
            let mut rng = rand::thread_rng();
            let mut seen = HashSet::with_capacity(executors);
            let mut seeds = Vec::with_capacity(executors);
            while seeds.len() < executors {
                let seed: u64 = rng.gen();
                if seen.insert(seed) {
                    seeds.push(seed);
                }
            }
            Ok((seeds, executors))
        }
    }
}

/// Parse a logger level name.
///
/// Accepts `trace|debug|info|warning|error|critical|off` as well as the `log`
/// crate's own names; `critical` maps to `error`.
pub fn parse_log_level(name: &str) -> Result<LevelFilter> {
    let normalized = match name.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" => "error".to_string(),
        other => other.to_string(),
    };
    LevelFilter::from_str(&normalized)
        .map_err(|_| FastBcError::Configuration(format!("unknown logger level '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators() {
        assert_eq!(parse_seeds("1,2 3\t4").unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(parse_seeds(" 7 , 8 ").unwrap(), vec![7, 8]);
    }

    #[test]
    fn rejects_duplicates_and_garbage() {
        assert!(matches!(parse_seeds("1,2,1"), Err(FastBcError::Configuration(_))));
        assert!(matches!(parse_seeds("1,x"), Err(FastBcError::Configuration(_))));
    }

    #[test]
    fn explicit_seeds_need_matching_executors() {
        assert!(resolve_seeds(Some("1,2"), None).is_err());
        assert!(resolve_seeds(Some("1,2"), Some(3)).is_err());
        assert_eq!(resolve_seeds(Some("1,2"), Some(2)).unwrap(), (vec![1, 2], 2));
    }

    #[test]
    fn generated_seeds_are_distinct() {
        let (seeds, executors) = resolve_seeds(None, Some(8)).unwrap();
        assert_eq!(executors, 8);
        assert_eq!(seeds.iter().collect::<HashSet<_>>().len(), 8);

        let (defaults, _) = resolve_seeds(None, None).unwrap();
        assert_eq!(defaults.len(), DEFAULT_EXECUTORS);
        assert!(resolve_seeds(None, Some(0)).is_err());
    }

    #[test]
    fn logger_levels_include_long_names() {
        assert_eq!(parse_log_level("warning").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_log_level("critical").unwrap(), LevelFilter::Error);
        assert_eq!(parse_log_level("WARN").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_log_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_log_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(parse_log_level("loud"), Err(FastBcError::Configuration(_))));
    }

    #[test]
    fn validation_catches_bad_settings() {
        assert!(Config::new(vec![1, 2], 0.01).validate().is_ok());
        assert!(Config { executors: 3, ..Config::new(vec![1, 2], 0.01) }.validate().is_err());
        assert!(Config { pivots_per_cluster: 0, ..Config::new(vec![1], 0.01) }.validate().is_err());
        assert!(Config { chunk_size: 0, ..Config::new(vec![1], 0.01) }.validate().is_err());
        assert!(Config { exact: true, ..Config::default() }.build_engine().is_ok());
    }
}
