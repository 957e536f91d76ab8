//! Dependency-counter back-substitution.
//!
//! Workers own rows round-robin but never meet at a barrier. Each owned row
//! `j` counts how many unknowns above it have been applied to its running
//! sum; the row is ready once that count reaches `n - 1 - j`. Readiness
//! immediately triggers the solve of `x_j`, which is then sent to every
//! peer's inbox and applied locally.
//!
//! Unknowns are applied strictly from the highest row down. Values that
//! arrive early wait in a per-worker buffer until the cursor reaches them,
//! which fixes the accumulation order of every running sum regardless of
//! message timing.

use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use trisolve_model::{RowOwnership, TriangularSystem};

use super::{SolveStrategy, run_workers};
use crate::config::Strategy;
use crate::error::{Result, SolveError};
use crate::partition::WorkerPartition;
use crate::solution::{Solution, SolveStats, WorkerOutput, assemble};

#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyCounterStrategy;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Message {
    Solved { row: usize, value: f64 },
    Abort { by: usize },
}

impl SolveStrategy for DependencyCounterStrategy {
    fn name(&self) -> &'static str {
        Strategy::DependencyCounter.as_str()
    }

    fn solve(
        &self,
        system: &TriangularSystem,
        workers: usize,
        step_timeout: Duration,
    ) -> Result<Solution> {
        let n = system.n();
        let ownership = RowOwnership::new(workers);

        let (senders, receivers): (Vec<Sender<Message>>, Vec<Receiver<Message>>) =
            (0..workers).map(|_| mpsc::channel()).unzip();
        // Receivers are not `Sync`; each worker takes its own out of a slot.
        let inboxes: Vec<Mutex<Option<Receiver<Message>>>> = receivers
            .into_iter()
            .map(|rx| Mutex::new(Some(rx)))
            .collect();

        let outputs = run_workers(self.name(), workers, |worker| {
            let inbox = inboxes[worker]
                .lock()
                .map_err(|_| SolveError::Internal(format!("inbox of worker {worker} poisoned")))?
                .take()
                .ok_or_else(|| SolveError::Internal(format!("inbox of worker {worker} taken twice")))?;
            let peers = Peers {
                worker,
                senders: senders.clone(),
            };
            let mut state = WorkerState::new(system, ownership, worker, step_timeout);
            let result = state.run(&inbox, &peers);
            if let Err(err) = &result
                && !err.is_secondary()
            {
                peers.abort();
            }
            result
        })?;

        let solution = assemble(n, outputs, SolveStats::new(Strategy::DependencyCounter, workers))?;
        log::debug!(
            "dependency-counter solve: n={n} workers={workers} messages={}",
            solution.stats.messages
        );
        Ok(solution)
    }
}

/// Outgoing side of every inbox.
struct Peers {
    worker: usize,
    senders: Vec<Sender<Message>>,
}

impl Peers {
    /// Send `message` to every worker except this one. Returns the number of
    /// messages sent. A peer that already finished has dropped its inbox and
    /// needs nothing further, so send failures are ignored.
    fn publish(&self, message: Message) -> usize {
        self.senders
            .iter()
            .enumerate()
            .filter(|(peer, _)| *peer != self.worker)
            .filter(|(_, sender)| sender.send(message).is_ok())
            .count()
    }

    fn abort(&self) {
        self.publish(Message::Abort { by: self.worker });
    }
}

impl Drop for Peers {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.abort();
        }
    }
}

struct WorkerState<'a> {
    system: &'a TriangularSystem,
    ownership: RowOwnership,
    partition: WorkerPartition<'a>,
    /// Unknowns received from peers but not yet applied.
    pending: Vec<Option<f64>>,
    /// Every row `>= cursor` has been applied to this worker's partition.
    cursor: usize,
    timeout: Duration,
    output: WorkerOutput,
}

impl<'a> WorkerState<'a> {
    fn new(
        system: &'a TriangularSystem,
        ownership: RowOwnership,
        worker: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            system,
            ownership,
            partition: WorkerPartition::new(system, ownership, worker),
            pending: vec![None; system.n()],
            cursor: system.n(),
            timeout,
            output: WorkerOutput::new(worker),
        }
    }

    fn worker(&self) -> usize {
        self.output.worker
    }

    fn run(&mut self, inbox: &Receiver<Message>, peers: &Peers) -> Result<WorkerOutput> {
        let worker = self.worker();
        let owned = self.partition.owned_count();
        log::debug!(
            "dependency worker {worker}: {owned} owned rows of {}",
            self.system.n()
        );

        loop {
            self.advance(peers);
            if self.output.solved.len() == owned {
                break;
            }

            match inbox.recv_timeout(self.timeout) {
                Ok(Message::Solved { row, value }) => {
                    let duplicate = row >= self.cursor || self.pending[row].is_some();
                    if duplicate || self.ownership.owner(row) == worker {
                        return Err(SolveError::Internal(format!(
                            "worker {worker} received row {row} twice or for a row it owns"
                        )));
                    }
                    self.pending[row] = Some(value);
                }
                Ok(Message::Abort { by }) => {
                    return Err(SolveError::Aborted { worker, by });
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(SolveError::Stalled {
                        worker,
                        row: self.cursor - 1,
                        timeout: self.timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(SolveError::Internal(format!(
                        "inbox of worker {worker} disconnected"
                    )));
                }
            }
        }

        log::debug!(
            "dependency worker {worker}: done after {} messages",
            self.output.messages
        );
        Ok(std::mem::take(&mut self.output))
    }

    /// Apply every unknown available at the cursor, solving owned rows as
    /// they become ready.
    fn advance(&mut self, peers: &Peers) {
        while self.cursor > 0 {
            let row = self.cursor - 1;
            let value = match self.pending[row].take() {
                Some(value) => value,
                None if self.partition.owns(row) && self.partition.is_ready(row) => {
                    self.solve_owned(row, peers)
                }
                None => break,
            };
            self.partition.apply(row, value);
            self.cursor = row;
        }
    }

    fn solve_owned(&mut self, row: usize, peers: &Peers) -> f64 {
        let outcome = self.partition.solve_row(row);
        if outcome.degenerate {
            self.output.degenerate.push(row);
        }
        self.output.solved.push((row, outcome.value));
        self.output.messages += peers.publish(Message::Solved {
            row,
            value: outcome.value,
        });
        log::trace!("worker {} solved row {row} = {}", self.worker(), outcome.value);
        outcome.value
    }
}
