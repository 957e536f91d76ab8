//! Domain model for dense upper-triangular systems `U·x = b`.
//!
//! The model is immutable once built: loaders and generators produce a
//! [`TriangularSystem`], after which every solver worker only reads it.

pub mod error;
pub mod ownership;
mod summary;
mod system;

pub use error::ModelError;
pub use ownership::{RowOwnership, owner};
pub use summary::SystemSummary;
pub use system::TriangularSystem;
