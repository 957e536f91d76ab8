//! Barrier-synchronized round-robin back-substitution.
//!
//! For each row `i` from `n-1` down to `0`:
//!
//! 1. the owner of `i` computes `x_i` from its fully reduced running sum,
//! 2. `x_i` is broadcast from the owner to every worker,
//! 3. each worker subtracts `c[j][i]·x_i` from its owned rows `j < i`,
//! 4. all workers meet at a barrier.
//!
//! The barrier makes every update of step `i` visible before the owner of
//! `i-1` reads its sum, so the running-sum invariant holds by induction.

use std::time::Duration;

use trisolve_model::{RowOwnership, TriangularSystem};

use super::{SolveStrategy, run_workers};
use crate::collective::{Collective, ThreadCollective};
use crate::config::Strategy;
use crate::error::{Result, SolveError};
use crate::partition::WorkerPartition;
use crate::solution::{Solution, SolveStats, WorkerOutput, assemble};

#[derive(Debug, Clone, Copy, Default)]
pub struct BarrierStrategy;

impl BarrierStrategy {
    /// Solve over an existing collective; the worker count is the
    /// collective's group size.
    pub fn solve_with<C: Collective>(
        &self,
        system: &TriangularSystem,
        collective: &C,
    ) -> Result<Solution> {
        let n = system.n();
        let workers = collective.workers();
        if workers == 0 || workers > n {
            return Err(SolveError::InvalidWorkerCount {
                workers,
                n,
                reason: "collective group size must be between 1 and the number of unknowns",
            });
        }

        let ownership = RowOwnership::new(workers);
        let outputs = run_workers(self.name(), workers, |worker| {
            let _guard = AbortOnPanic { collective, worker };
            let result = run_worker(system, collective, ownership, worker);
            if let Err(err) = &result
                && !err.is_secondary()
            {
                collective.abort(worker);
            }
            result
        })?;

        let solution = assemble(n, outputs, SolveStats::new(Strategy::Barrier, workers))?;
        log::debug!(
            "barrier solve: n={n} workers={workers} barriers={} broadcasts={}",
            solution.stats.barriers,
            solution.stats.broadcasts
        );
        Ok(solution)
    }
}

impl SolveStrategy for BarrierStrategy {
    fn name(&self) -> &'static str {
        Strategy::Barrier.as_str()
    }

    fn solve(
        &self,
        system: &TriangularSystem,
        workers: usize,
        step_timeout: Duration,
    ) -> Result<Solution> {
        let collective = ThreadCollective::new(workers, step_timeout);
        self.solve_with(system, &collective)
    }
}

fn run_worker<C: Collective>(
    system: &TriangularSystem,
    collective: &C,
    ownership: RowOwnership,
    worker: usize,
) -> Result<WorkerOutput> {
    let n = system.n();
    let mut partition = WorkerPartition::new(system, ownership, worker);
    let mut replica = vec![0.0; n];
    let mut output = WorkerOutput::new(worker);
    log::debug!("barrier worker {worker}: {} owned rows", partition.owned_count());

    for step in (0..n).rev() {
        let root = ownership.owner(step);
        let local = if root == worker {
            let outcome = partition.solve_row(step);
            if outcome.degenerate {
                output.degenerate.push(step);
            }
            output.solved.push((step, outcome.value));
            log::trace!("worker {worker} solved row {step} = {}", outcome.value);
            Some(outcome.value)
        } else {
            None
        };

        let value = collective.broadcast(worker, root, step, local)?;
        output.broadcasts += 1;
        replica[step] = value;

        partition.apply(step, value);

        collective.barrier(worker, step)?;
        output.barriers += 1;
    }

    output.replica = Some(replica);
    log::debug!("barrier worker {worker}: done");
    Ok(output)
}

struct AbortOnPanic<'a, C: Collective> {
    collective: &'a C,
    worker: usize,
}

impl<C: Collective> Drop for AbortOnPanic<'_, C> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.collective.abort(self.worker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CollectiveError, CollectiveOp};

    fn fixture() -> TriangularSystem {
        TriangularSystem::from_upper_rows(
            vec![vec![1.0, 2.0, 3.0], vec![1.0, 4.0], vec![1.0]],
            vec![14.0, 9.0, 5.0],
        )
        .unwrap()
    }

    #[test]
    fn barrier_solves_fixture_for_every_worker_count() {
        let system = fixture();
        for workers in 1..=3 {
            let solution = BarrierStrategy
                .solve(&system, workers, Duration::from_secs(5))
                .expect("solve");
            assert_eq!(solution.as_slice(), &[21.0, -11.0, 5.0], "workers={workers}");
            assert_eq!(solution.stats.barriers, 3);
            assert_eq!(solution.stats.broadcasts, 3);
        }
    }

    #[test]
    fn oversized_collective_is_rejected() {
        let system = fixture();
        let collective = ThreadCollective::new(4, Duration::from_secs(1));
        let err = BarrierStrategy
            .solve_with(&system, &collective)
            .expect_err("4 workers for 3 unknowns");
        assert!(matches!(err, SolveError::InvalidWorkerCount { workers: 4, .. }));
    }

    /// Collective whose barrier never completes for one worker.
    struct StuckBarrier {
        inner: ThreadCollective,
        stuck: usize,
    }

    impl Collective for StuckBarrier {
        fn workers(&self) -> usize {
            self.inner.workers()
        }

        fn broadcast(
            &self,
            worker: usize,
            root: usize,
            step: usize,
            value: Option<f64>,
        ) -> std::result::Result<f64, CollectiveError> {
            self.inner.broadcast(worker, root, step, value)
        }

        fn barrier(&self, worker: usize, step: usize) -> std::result::Result<(), CollectiveError> {
            if worker == self.stuck {
                return Err(CollectiveError::Timeout {
                    worker,
                    op: CollectiveOp::Barrier,
                    step,
                });
            }
            self.inner.barrier(worker, step)
        }

        fn abort(&self, by: usize) {
            self.inner.abort(by);
        }
    }

    #[test]
    fn coordination_failure_surfaces_as_timeout() {
        let system = fixture();
        let collective = StuckBarrier {
            inner: ThreadCollective::new(2, Duration::from_secs(5)),
            stuck: 1,
        };
        let err = BarrierStrategy
            .solve_with(&system, &collective)
            .expect_err("worker 1 never passes the barrier");
        assert!(matches!(
            err,
            SolveError::Collective(CollectiveError::Timeout { worker: 1, .. })
        ));
    }
}
