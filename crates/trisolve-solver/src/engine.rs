//! Back-substitution engine.
//!
//! The engine validates the worker count against the system, selects the
//! configured strategy and runs exactly one solve. Worker pools are created
//! per solve and joined before `solve` returns, so no state survives between
//! calls.

use trisolve_model::TriangularSystem;

use crate::config::{SolverConfig, Strategy};
use crate::error::{Result, SolveError};
use crate::solution::Solution;

pub struct BackSubstitutionEngine {
    config: SolverConfig,
}

impl BackSubstitutionEngine {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve `system`, returning its unknowns.
    ///
    /// Zero pivots are not errors: the affected unknowns are defined as `0`
    /// and listed in [`Solution::degenerate_pivots`].
    pub fn solve(&self, system: &TriangularSystem) -> Result<Solution> {
        let SolverConfig {
            workers,
            strategy,
            step_timeout,
        } = self.config;
        validate_worker_count(strategy, workers, system.n())?;

        let backend = strategy.backend();
        log::debug!(
            "solving {} unknowns with {} on {workers} worker(s)",
            system.n(),
            backend.name()
        );
        let solution = backend.solve(system, workers, step_timeout)?;

        if !solution.degenerate_pivots.is_empty() {
            log::warn!(
                "{} zero pivot(s); affected unknowns set to 0",
                solution.degenerate_pivots.len()
            );
        }
        Ok(solution)
    }
}

/// Solve `system` with `workers` workers using `strategy` and default
/// timeouts.
pub fn solve(system: &TriangularSystem, workers: usize, strategy: Strategy) -> Result<Solution> {
    BackSubstitutionEngine::new(SolverConfig {
        workers,
        strategy,
        ..Default::default()
    })
    .solve(system)
}

/// Check a worker count against `n` unknowns: `1 <= workers <= n`, and
/// exactly one worker for [`Strategy::Sequential`].
pub fn validate_worker_count(strategy: Strategy, workers: usize, n: usize) -> Result<()> {
    let reason = if workers == 0 {
        "at least one worker is required"
    } else if workers > n {
        "more workers than unknowns"
    } else if strategy == Strategy::Sequential && workers != 1 {
        "the sequential strategy runs on exactly one worker"
    } else {
        return Ok(());
    };
    Err(SolveError::InvalidWorkerCount { workers, n, reason })
}
