//! Scheduling strategies for back-substitution.
//!
//! All strategies accumulate each running sum in the same order (descending
//! column index), so for a given system they produce bit-identical unknowns.
//! They differ only in how workers coordinate:
//!
//! ```text
//!   Sequential          one thread, no coordination
//!   Barrier             broadcast + barrier per row (n rendezvous)
//!   DependencyCounter   per-worker inboxes, rows solve when their
//!                       downstream contributions have all landed
//! ```

mod barrier;
mod dependency;
mod sequential;

pub use barrier::BarrierStrategy;
pub use dependency::DependencyCounterStrategy;
pub use sequential::SequentialStrategy;

use std::thread;
use std::time::Duration;

use trisolve_model::TriangularSystem;

use crate::error::{Result, SolveError};
use crate::solution::{Solution, WorkerOutput};

/// A back-substitution scheduling strategy.
///
/// Implementations receive a validated worker count (`1 <= workers <= n`).
pub trait SolveStrategy: Send + Sync {
    /// Stable name used in reports and on the command line.
    fn name(&self) -> &'static str;

    /// Solve `system` with `workers` workers. No single wait may exceed
    /// `step_timeout`.
    fn solve(
        &self,
        system: &TriangularSystem,
        workers: usize,
        step_timeout: Duration,
    ) -> Result<Solution>;
}

/// Run `body` on `workers` named scoped threads and collect their outputs.
///
/// When several workers fail, the reported error is the first one that is
/// not merely a consequence of another worker's failure.
pub(crate) fn run_workers<F>(label: &str, workers: usize, body: F) -> Result<Vec<WorkerOutput>>
where
    F: Fn(usize) -> Result<WorkerOutput> + Sync,
{
    let body = &body;
    let results: Vec<Result<WorkerOutput>> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        let mut results = Vec::with_capacity(workers);
        for worker in 0..workers {
            let spawned = thread::Builder::new()
                .name(format!("trisolve-{label}-{worker}"))
                .spawn_scoped(scope, move || body(worker));
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(source) => results.push(Err(SolveError::Spawn { worker, source })),
            }
        }
        for (worker, handle) in handles {
            results.push(
                handle
                    .join()
                    .unwrap_or(Err(SolveError::WorkerPanicked { worker })),
            );
        }
        results
    });

    let mut outputs = Vec::with_capacity(workers);
    let mut secondary = None;
    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(err) if err.is_secondary() => {
                secondary.get_or_insert(err);
            }
            Err(err) => return Err(err),
        }
    }
    match secondary {
        Some(err) => Err(err),
        None => Ok(outputs),
    }
}
