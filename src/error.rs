//! Error types for grammar construction.

use std::fmt;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = GrammarError> = std::result::Result<T, E>;

/// A bounded resource of a construction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Live rules, including the top-level rule.
    Rules,
    /// Registered digrams in the digram index.
    Digrams,
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Rules => f.write_str("rules"),
            Capacity::Digrams => f.write_str("digrams"),
        }
    }
}

/// Errors surfaced by [`Sequitur`](crate::Sequitur).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The engine found its own bookkeeping inconsistent. The run is aborted.
    #[error("grammar invariant violated: {0}")]
    InvariantViolation(String),

    /// The grammar went beyond a configured bound. The symbol was appended
    /// and the grammar is still valid.
    #[error("capacity exceeded: {resource} limit is {limit}")]
    CapacityExceeded { resource: Capacity, limit: usize },

    /// An earlier invariant violation aborted this run.
    #[error("construction run was aborted by an earlier invariant violation")]
    Aborted,
}

impl GrammarError {
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        GrammarError::InvariantViolation(msg.into())
    }

    /// Returns true for errors that leave the grammar intact.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GrammarError::CapacityExceeded { .. })
    }
}
