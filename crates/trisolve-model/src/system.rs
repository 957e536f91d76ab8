use nalgebra::{DMatrix, DVector};

use crate::ModelError;

/// Dense upper-triangular system `U·x = b`.
///
/// Entries strictly below the diagonal are always zero. The struct is
/// read-only after construction so it can be shared by reference across
/// solver workers without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangularSystem {
    coefficients: DMatrix<f64>,
    free_terms: DVector<f64>,
}

impl TriangularSystem {
    /// Build a system from a full `n×n` matrix and a length-`n` vector.
    pub fn new(coefficients: DMatrix<f64>, free_terms: DVector<f64>) -> Result<Self, ModelError> {
        let (rows, cols) = coefficients.shape();
        if rows != cols {
            return Err(ModelError::NotSquare { rows, cols });
        }
        if rows == 0 {
            return Err(ModelError::Empty);
        }
        if free_terms.len() != rows {
            return Err(ModelError::LengthMismatch {
                expected: rows,
                actual: free_terms.len(),
            });
        }
        for row in 1..rows {
            for col in 0..row {
                let value = coefficients[(row, col)];
                if value != 0.0 {
                    return Err(ModelError::NotUpperTriangular { row, col, value });
                }
            }
        }

        Ok(Self {
            coefficients,
            free_terms,
        })
    }

    /// Build a system from the upper-triangular row layout used by the
    /// coefficient file: row `i` holds the `n - i` entries of columns `i..n`.
    pub fn from_upper_rows(rows: Vec<Vec<f64>>, free_terms: Vec<f64>) -> Result<Self, ModelError> {
        let n = rows.len();
        if n == 0 {
            return Err(ModelError::Empty);
        }
        if free_terms.len() != n {
            return Err(ModelError::LengthMismatch {
                expected: n,
                actual: free_terms.len(),
            });
        }

        let mut coefficients = DMatrix::zeros(n, n);
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != n - row {
                return Err(ModelError::RowLength {
                    row,
                    expected: n - row,
                    actual: entries.len(),
                });
            }
            for (offset, &value) in entries.iter().enumerate() {
                coefficients[(row, row + offset)] = value;
            }
        }

        Ok(Self {
            coefficients,
            free_terms: DVector::from_vec(free_terms),
        })
    }

    /// Number of unknowns (and equations).
    pub fn n(&self) -> usize {
        self.free_terms.len()
    }

    pub fn coefficient(&self, row: usize, col: usize) -> f64 {
        self.coefficients[(row, col)]
    }

    /// Diagonal coefficient of equation `row`.
    pub fn pivot(&self, row: usize) -> f64 {
        self.coefficients[(row, row)]
    }

    pub fn free_term(&self, row: usize) -> f64 {
        self.free_terms[row]
    }

    pub fn free_terms(&self) -> &DVector<f64> {
        &self.free_terms
    }

    /// Upper part of row `row` (columns `row..n`).
    pub fn upper_row(&self, row: usize) -> impl Iterator<Item = f64> + '_ {
        (row..self.n()).map(move |col| self.coefficients[(row, col)])
    }

    /// Indices whose diagonal coefficient is exactly zero.
    pub fn zero_pivots(&self) -> Vec<usize> {
        (0..self.n()).filter(|&k| self.pivot(k) == 0.0).collect()
    }
}
