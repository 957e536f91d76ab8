//! Collective communication between solver workers.
//!
//! The barrier strategy only needs two primitives: a one-to-all broadcast of
//! a solved unknown and a full barrier. [`Collective`] keeps the engine
//! independent of the substrate; [`ThreadCollective`] implements it for
//! threads sharing memory.
//!
//! Every wait is bounded. A worker that never arrives surfaces as
//! [`CollectiveError::Timeout`] on its peers instead of a deadlock, and a
//! worker that fails can [`abort`](Collective::abort) the group so peers stop
//! immediately.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{CollectiveError, CollectiveOp};

/// Collective primitives over a fixed group of workers `0..workers()`.
pub trait Collective: Send + Sync {
    /// Number of participating workers.
    fn workers(&self) -> usize;

    /// Broadcast the value held by `root` for `step` to every worker.
    ///
    /// `root` passes `Some(value)`; all other workers pass `None`. Every
    /// worker, including the root, receives the same value.
    fn broadcast(
        &self,
        worker: usize,
        root: usize,
        step: usize,
        value: Option<f64>,
    ) -> Result<f64, CollectiveError>;

    /// Block until every worker has reached the barrier for `step`.
    fn barrier(&self, worker: usize, step: usize) -> Result<(), CollectiveError>;

    /// Release every waiter with [`CollectiveError::Aborted`].
    fn abort(&self, by: usize);
}

#[derive(Debug)]
struct GroupState {
    arrived: usize,
    generation: u64,
    published: Option<(usize, f64)>,
    aborted_by: Option<usize>,
}

/// Shared-memory collective over `Mutex` + `Condvar`.
#[derive(Debug)]
pub struct ThreadCollective {
    workers: usize,
    timeout: Duration,
    state: Mutex<GroupState>,
    changed: Condvar,
}

impl ThreadCollective {
    /// # Panics
    /// Panics if `workers == 0`.
    pub fn new(workers: usize, timeout: Duration) -> Self {
        assert!(workers > 0, "collective requires at least 1 worker");
        Self {
            workers,
            timeout,
            state: Mutex::new(GroupState {
                arrived: 0,
                generation: 0,
                published: None,
                aborted_by: None,
            }),
            changed: Condvar::new(),
        }
    }

    // The state is plain data; a panicking peer cannot leave it half-updated
    // in a way that matters, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, GroupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Collective for ThreadCollective {
    fn workers(&self) -> usize {
        self.workers
    }

    fn broadcast(
        &self,
        worker: usize,
        root: usize,
        step: usize,
        value: Option<f64>,
    ) -> Result<f64, CollectiveError> {
        if worker == root {
            let value = value.ok_or(CollectiveError::MissingValue { root, step })?;
            let mut state = self.lock();
            if let Some(by) = state.aborted_by {
                return Err(CollectiveError::Aborted { by });
            }
            state.published = Some((step, value));
            drop(state);
            self.changed.notify_all();
            return Ok(value);
        }

        let (state, _) = self
            .changed
            .wait_timeout_while(self.lock(), self.timeout, |state| {
                state.aborted_by.is_none()
                    && state.published.map(|(published, _)| published) != Some(step)
            })
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(by) = state.aborted_by {
            return Err(CollectiveError::Aborted { by });
        }
        match state.published {
            Some((published, value)) if published == step => Ok(value),
            _ => Err(CollectiveError::Timeout {
                worker,
                op: CollectiveOp::Broadcast,
                step,
            }),
        }
    }

    fn barrier(&self, worker: usize, step: usize) -> Result<(), CollectiveError> {
        let mut state = self.lock();
        if let Some(by) = state.aborted_by {
            return Err(CollectiveError::Aborted { by });
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.workers {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            drop(state);
            self.changed.notify_all();
            return Ok(());
        }

        let (mut state, _) = self
            .changed
            .wait_timeout_while(state, self.timeout, |state| {
                state.aborted_by.is_none() && state.generation == generation
            })
            .unwrap_or_else(PoisonError::into_inner);

        if state.generation != generation {
            return Ok(());
        }
        state.arrived = state.arrived.saturating_sub(1);
        if let Some(by) = state.aborted_by {
            return Err(CollectiveError::Aborted { by });
        }
        Err(CollectiveError::Timeout {
            worker,
            op: CollectiveOp::Barrier,
            step,
        })
    }

    fn abort(&self, by: usize) {
        let mut state = self.lock();
        if state.aborted_by.is_none() {
            state.aborted_by = Some(by);
        }
        drop(state);
        self.changed.notify_all();
    }
}
