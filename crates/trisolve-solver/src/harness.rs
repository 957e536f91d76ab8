//! Timing harness around the engine.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use trisolve_io::RunReport;
use trisolve_model::TriangularSystem;

use crate::config::{SolverConfig, Strategy};
use crate::engine::BackSubstitutionEngine;
use crate::error::Result;
use crate::solution::Solution;
use crate::verify::VerificationReport;

/// A solution together with the wall-clock time of the solve that produced it.
#[derive(Debug, Clone)]
pub struct TimedSolve {
    pub solution: Solution,
    pub elapsed: Duration,
}

/// Time exactly one engine solve.
pub fn run(system: &TriangularSystem, config: &SolverConfig) -> Result<TimedSolve> {
    let engine = BackSubstitutionEngine::new(config.clone());
    let start = Instant::now();
    let solution = engine.solve(system)?;
    let elapsed = start.elapsed();
    log::info!(
        "{} with {} worker(s): {n} unknowns in {elapsed:?}",
        config.strategy,
        config.workers,
        n = system.n()
    );
    Ok(TimedSolve { solution, elapsed })
}

#[derive(Debug, Clone)]
pub struct StrategyComparison {
    pub runs: Vec<(SolverConfig, TimedSolve)>,
    /// Largest absolute difference between any run and the sequential run
    pub max_deviation: f64,
}

/// Solve with every strategy: sequential on one worker, the parallel
/// strategies on `workers`.
pub fn compare_strategies(
    system: &TriangularSystem,
    workers: usize,
    step_timeout: Duration,
) -> Result<StrategyComparison> {
    let mut runs = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let config = SolverConfig {
            workers: if strategy == Strategy::Sequential { 1 } else { workers },
            strategy,
            step_timeout,
        };
        let timed = run(system, &config)?;
        runs.push((config, timed));
    }

    let reference = runs[0].1.solution.as_slice();
    let max_deviation = runs
        .iter()
        .map(|(_, timed)| deviation(reference, timed.solution.as_slice()))
        .fold(0.0, nan_max);

    Ok(StrategyComparison {
        runs,
        max_deviation,
    })
}

/// Largest absolute elementwise difference; NaN if any difference is NaN.
fn deviation(reference: &[f64], values: &[f64]) -> f64 {
    reference
        .iter()
        .zip(values)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, nan_max)
}

fn nan_max(acc: f64, value: f64) -> f64 {
    if acc.is_nan() || value.is_nan() {
        f64::NAN
    } else {
        acc.max(value)
    }
}

/// Build the persisted report of one timed, verified solve.
///
/// `total_elapsed_seconds` starts out equal to the solve time; callers that
/// also timed loading overwrite it.
pub fn build_report(
    job_name: impl Into<String>,
    system: &TriangularSystem,
    config: &SolverConfig,
    timed: &TimedSolve,
    verification: &VerificationReport,
    metadata: BTreeMap<String, String>,
) -> RunReport {
    RunReport {
        job_name: job_name.into(),
        unknowns: system.n(),
        strategy: config.strategy.to_string(),
        workers: config.workers,
        elapsed_seconds: timed.elapsed.as_secs_f64(),
        total_elapsed_seconds: timed.elapsed.as_secs_f64(),
        accepted: verification.accepted,
        tolerance: verification.tolerance,
        max_residual: verification.max_residual,
        worst_equation: verification.worst_equation,
        degenerate_pivots: timed.solution.degenerate_pivots.clone(),
        metadata,
        ..Default::default()
    }
}
