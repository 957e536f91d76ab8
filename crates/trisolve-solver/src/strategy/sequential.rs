use std::time::Duration;

use nalgebra::DVector;
use trisolve_model::TriangularSystem;

use super::SolveStrategy;
use crate::config::Strategy;
use crate::error::Result;
use crate::partition::divide_by_pivot;
use crate::solution::{Solution, SolveStats};

/// Single-threaded reference back-substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStrategy;

impl SolveStrategy for SequentialStrategy {
    fn name(&self) -> &'static str {
        Strategy::Sequential.as_str()
    }

    fn solve(
        &self,
        system: &TriangularSystem,
        workers: usize,
        _step_timeout: Duration,
    ) -> Result<Solution> {
        debug_assert_eq!(workers, 1);
        let n = system.n();
        let mut values = DVector::zeros(n);
        let mut degenerate_pivots = Vec::new();

        for row in (0..n).rev() {
            let mut sum = system.free_term(row);
            for col in (row + 1..n).rev() {
                sum -= system.coefficient(row, col) * values[col];
            }
            let outcome = divide_by_pivot(row, sum, system.pivot(row));
            if outcome.degenerate {
                degenerate_pivots.push(row);
            }
            values[row] = outcome.value;
        }

        degenerate_pivots.reverse();
        Ok(Solution {
            values,
            degenerate_pivots,
            stats: SolveStats::new(Strategy::Sequential, 1),
        })
    }
}
