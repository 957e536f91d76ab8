use nalgebra::DVector;

use crate::config::Strategy;
use crate::error::{Result, SolveError};

/// Coordination counters for one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveStats {
    pub strategy: Strategy,
    pub workers: usize,
    /// Barrier rendezvous per worker
    pub barriers: usize,
    pub broadcasts: usize,
    /// Point-to-point messages sent by all workers
    pub messages: usize,
}

impl SolveStats {
    pub fn new(strategy: Strategy, workers: usize) -> Self {
        Self {
            strategy,
            workers,
            barriers: 0,
            broadcasts: 0,
            messages: 0,
        }
    }
}

/// Solved unknowns plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: DVector<f64>,
    /// Rows whose pivot was zero, ascending. Their unknowns are `0`.
    pub degenerate_pivots: Vec<usize>,
    pub stats: SolveStats,
}

impl Solution {
    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }
}

/// What one worker produced: the unknowns of the rows it owns.
#[derive(Debug, Clone, Default)]
pub struct WorkerOutput {
    pub worker: usize,
    pub solved: Vec<(usize, f64)>,
    pub degenerate: Vec<usize>,
    pub barriers: usize,
    pub broadcasts: usize,
    pub messages: usize,
    /// Full replicated solution, for strategies that keep one per worker.
    pub replica: Option<Vec<f64>>,
}

impl WorkerOutput {
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Default::default()
        }
    }
}

/// Merge worker outputs into a solution, enforcing that every index was
/// written exactly once and that all replicas agree with the merged result.
pub(crate) fn assemble(n: usize, outputs: Vec<WorkerOutput>, mut stats: SolveStats) -> Result<Solution> {
    let mut values: Vec<Option<f64>> = vec![None; n];
    let mut degenerate_pivots = Vec::new();

    for output in &outputs {
        for &(row, value) in &output.solved {
            let slot = values.get_mut(row).ok_or_else(|| {
                SolveError::Internal(format!("worker {} solved row {row} of {n}", output.worker))
            })?;
            if slot.replace(value).is_some() {
                return Err(SolveError::Internal(format!(
                    "row {row} was solved more than once"
                )));
            }
        }
        degenerate_pivots.extend_from_slice(&output.degenerate);
        stats.barriers = stats.barriers.max(output.barriers);
        stats.broadcasts = stats.broadcasts.max(output.broadcasts);
        stats.messages += output.messages;
    }

    let values = values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| SolveError::Internal(format!("row {row} was never solved")))
        })
        .collect::<Result<Vec<f64>>>()?;

    for output in &outputs {
        if let Some(replica) = &output.replica {
            let agrees = replica.len() == n
                && replica
                    .iter()
                    .zip(&values)
                    .all(|(a, b)| a.to_bits() == b.to_bits());
            if !agrees {
                return Err(SolveError::Internal(format!(
                    "replica of worker {} diverged from the owners' values",
                    output.worker
                )));
            }
        }
    }

    degenerate_pivots.sort_unstable();
    Ok(Solution {
        values: DVector::from_vec(values),
        degenerate_pivots,
        stats,
    })
}
