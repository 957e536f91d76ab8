//! Ownership-partitioned residual state.
//!
//! Each worker holds the running sums of exactly the rows it owns, stored
//! densely by local slot (`row / P`). No slot is ever visible to another
//! worker, so partitions need no synchronization; solved unknowns reach
//! other workers only through the collective or an inbox message.

use trisolve_model::{RowOwnership, TriangularSystem};

/// Result of computing one unknown from its fully reduced running sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotOutcome {
    pub value: f64,
    /// The pivot was zero and the unknown was defined as `0`.
    pub degenerate: bool,
}

/// Compute `x = sum / pivot`, defining `x = 0` when the pivot is zero.
pub fn divide_by_pivot(row: usize, sum: f64, pivot: f64) -> PivotOutcome {
    if pivot == 0.0 {
        log::warn!("row {row}: zero pivot, unknown defined as 0");
        return PivotOutcome {
            value: 0.0,
            degenerate: true,
        };
    }
    PivotOutcome {
        value: sum / pivot,
        degenerate: false,
    }
}

#[derive(Debug)]
pub struct WorkerPartition<'a> {
    system: &'a TriangularSystem,
    ownership: RowOwnership,
    worker: usize,
    sums: Vec<f64>,
    applied: Vec<usize>,
}

impl<'a> WorkerPartition<'a> {
    pub fn new(system: &'a TriangularSystem, ownership: RowOwnership, worker: usize) -> Self {
        let n = system.n();
        let mut sums = vec![0.0; ownership.owned_count(worker, n)];
        for row in ownership.owned_rows(worker, n) {
            sums[row / ownership.workers()] = system.free_term(row);
        }
        let applied = vec![0; sums.len()];
        Self {
            system,
            ownership,
            worker,
            sums,
            applied,
        }
    }

    pub fn worker(&self) -> usize {
        self.worker
    }

    pub fn owns(&self, row: usize) -> bool {
        self.ownership.owner(row) == self.worker
    }

    pub fn owned_count(&self) -> usize {
        self.sums.len()
    }

    /// Current running sum of an owned row.
    pub fn sum(&self, row: usize) -> f64 {
        self.sums[self.slot(row)]
    }

    /// Number of downstream unknowns already applied to an owned row.
    pub fn applied(&self, row: usize) -> usize {
        self.applied[self.slot(row)]
    }

    /// An owned row is ready once every unknown above it has been applied.
    pub fn is_ready(&self, row: usize) -> bool {
        self.applied(row) == self.system.n() - 1 - row
    }

    /// Compute the unknown of an owned, ready row.
    pub fn solve_row(&self, row: usize) -> PivotOutcome {
        debug_assert!(self.is_ready(row), "row {row} solved before it was ready");
        divide_by_pivot(row, self.sum(row), self.system.pivot(row))
    }

    /// Apply the contribution of unknown `solved_row` to every owned row
    /// below it. Returns the number of rows updated.
    pub fn apply(&mut self, solved_row: usize, value: f64) -> usize {
        let workers = self.ownership.workers();
        let mut updated = 0;
        for row in self.ownership.owned_rows_below(self.worker, solved_row) {
            let slot = row / workers;
            self.sums[slot] -= self.system.coefficient(row, solved_row) * value;
            self.applied[slot] += 1;
            updated += 1;
        }
        updated
    }

    fn slot(&self, row: usize) -> usize {
        debug_assert!(self.owns(row), "worker {} does not own row {row}", self.worker);
        row / self.ownership.workers()
    }
}
