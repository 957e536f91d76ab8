//! Static row ownership.
//!
//! Row `i` belongs to worker `i mod P`. The mapping needs no communication,
//! so every worker can decide locally who computes `x_i` and who holds the
//! running sum of row `i`.

/// Worker responsible for row `row` when `workers` participate.
pub fn owner(row: usize, workers: usize) -> usize {
    row % workers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOwnership {
    workers: usize,
}

impl RowOwnership {
    /// # Panics
    /// Panics if `workers == 0`.
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "ownership requires at least one worker");
        Self { workers }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn owner(&self, row: usize) -> usize {
        owner(row, self.workers)
    }

    /// Rows `< n` owned by `worker`, largest first.
    pub fn owned_rows(&self, worker: usize, n: usize) -> impl Iterator<Item = usize> {
        self.owned_rows_below(worker, n)
    }

    /// Rows strictly below `bound` owned by `worker`, largest first.
    ///
    /// Starts at the largest owned index below `bound` and steps down by the
    /// worker count.
    pub fn owned_rows_below(&self, worker: usize, bound: usize) -> impl Iterator<Item = usize> {
        let start = self.largest_owned_below(worker, bound);
        let step = self.workers;
        std::iter::successors(start, move |&row| row.checked_sub(step))
    }

    pub fn owned_count(&self, worker: usize, n: usize) -> usize {
        if worker >= n {
            return 0;
        }
        (n - worker).div_ceil(self.workers)
    }

    fn largest_owned_below(&self, worker: usize, bound: usize) -> Option<usize> {
        if worker >= self.workers || bound <= worker {
            return None;
        }
        let top = bound - 1;
        Some(top - (top - worker) % self.workers)
    }
}
