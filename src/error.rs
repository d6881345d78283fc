//! Error types for the betweenness engine

use thiserror::Error;

/// Errors raised by the clustered betweenness engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FastBcError {
    /// Invalid seeds, executor count or precision. Detected before any work starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A stage produced output that breaks an invariant of the next stage.
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// A cluster reached pivot selection without members.
    #[error("pivot selection failed: cluster {cluster} has no members")]
    Selection { cluster: u32 },
}

impl FastBcError {
    /// True for faults caused by a logic error inside the engine rather than by user input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InternalConsistency(_) | Self::Selection { .. })
    }
}

pub type Result<T> = std::result::Result<T, FastBcError>;
