//! Error types for trisolve-io

use std::path::PathBuf;

use thiserror::Error;
use trisolve_model::ModelError;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The flat-text format reserves zero: the reader replaces it on load.
    #[error("cannot write {what}: a zero would be replaced when the file is read back")]
    Unrepresentable { what: String },

    #[error("Invalid system: {0}")]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        IoError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
