//! I/O support for trisolve.
//!
//! This crate provides:
//! - **Flat-text reader** for the three system artifacts (unknown count,
//!   upper-triangular coefficients, free terms), including load-time
//!   sanitization of zero entries
//! - **Flat-text writer** producing files the reader consumes unchanged
//! - **Synthetic generator** for seeded, diagonally dominant systems
//! - **JSON run reports** persisted after a timed solve

pub mod error;
mod generator;
mod paths;
mod reader;
mod report;
mod writer;

pub use error::{IoError, Result};
pub use generator::generate_system;
pub use paths::SystemPaths;
pub use reader::{
    COEFFICIENT_SCALE, FREE_TERM_FALLBACK, PIVOT_FALLBACK, read_coefficients, read_free_terms,
    read_system, read_unknown_count,
};
pub use report::{RunReport, load_report, save_report};
pub use writer::write_system;
