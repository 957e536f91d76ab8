//! Error types for trisolve-solver

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolveError>;

/// Collective operation that failed to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectiveOp {
    Broadcast,
    Barrier,
}

impl fmt::Display for CollectiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectiveOp::Broadcast => write!(f, "broadcast"),
            CollectiveOp::Barrier => write!(f, "barrier"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectiveError {
    #[error("worker {worker} timed out in {op} at step {step}")]
    Timeout {
        worker: usize,
        op: CollectiveOp,
        step: usize,
    },

    #[error("root worker {root} broadcast no value at step {step}")]
    MissingValue { root: usize, step: usize },

    #[error("collective aborted by worker {by}")]
    Aborted { by: usize },
}

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("invalid worker count {workers} for {n} unknowns: {reason}")]
    InvalidWorkerCount {
        workers: usize,
        n: usize,
        reason: &'static str,
    },

    #[error(transparent)]
    Collective(#[from] CollectiveError),

    #[error("worker {worker} stalled waiting for row {row} (no progress within {timeout:?})")]
    Stalled {
        worker: usize,
        row: usize,
        timeout: Duration,
    },

    #[error("worker {worker} stopped because worker {by} failed")]
    Aborted { worker: usize, by: usize },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("internal solver error: {0}")]
    Internal(String),
}

impl SolveError {
    /// Whether this error only reports that some other worker failed first.
    pub fn is_secondary(&self) -> bool {
        matches!(
            self,
            SolveError::Aborted { .. } | SolveError::Collective(CollectiveError::Aborted { .. })
        )
    }
}
