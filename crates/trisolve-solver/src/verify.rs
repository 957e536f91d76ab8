//! Residual verification.
//!
//! A solution is accepted when every equation satisfies
//! `|Σ_{j≥i} c[i][j]·x_j − b_i| ≤ tolerance`. Rows are checked in parallel.

use rayon::prelude::*;
use trisolve_model::TriangularSystem;

/// Absolute residual tolerance used by the benchmark.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub accepted: bool,
    pub tolerance: f64,
    /// Largest absolute residual (NaN if any residual is NaN)
    pub max_residual: f64,
    pub worst_equation: Option<usize>,
    pub failed_equations: Vec<usize>,
}

/// Absolute residual of every equation.
///
/// # Panics
/// Panics if `solution` does not have one entry per unknown.
pub fn residuals(system: &TriangularSystem, solution: &[f64]) -> Vec<f64> {
    let n = system.n();
    assert_eq!(solution.len(), n, "solution length must match the system");
    (0..n)
        .into_par_iter()
        .map(|row| {
            let lhs: f64 = (row..n)
                .map(|col| system.coefficient(row, col) * solution[col])
                .sum();
            (lhs - system.free_term(row)).abs()
        })
        .collect()
}

pub fn verify(system: &TriangularSystem, solution: &[f64], tolerance: f64) -> VerificationReport {
    let residuals = residuals(system, solution);

    let failed_equations: Vec<usize> = residuals
        .iter()
        .enumerate()
        .filter(|(_, residual)| residual.is_nan() || **residual > tolerance)
        .map(|(row, _)| row)
        .collect();
    // `abs` clears the sign bit, so NaN residuals order above every number.
    let worst = residuals
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b));
    let worst_equation = worst.map(|(row, _)| row);
    let max_residual = worst.map_or(0.0, |(_, &residual)| residual);

    let accepted = failed_equations.is_empty();
    if !accepted {
        log::warn!(
            "{} equation(s) exceed residual tolerance {tolerance}; worst {max_residual:e}",
            failed_equations.len()
        );
    }
    VerificationReport {
        accepted,
        tolerance,
        max_residual,
        worst_equation,
        failed_equations,
    }
}
