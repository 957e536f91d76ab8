//! Error types for trisolve-model

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("system must have at least one unknown")]
    Empty,

    #[error("coefficient matrix is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },

    #[error("free term vector has {actual} entries, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("coefficient ({row}, {col}) = {value} lies below the diagonal")]
    NotUpperTriangular { row: usize, col: usize, value: f64 },

    #[error("upper row {row} has {actual} entries, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
