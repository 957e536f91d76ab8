use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome of one timed solve, persisted as pretty JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub schema_version: u32,
    pub job_name: String,
    /// RFC 3339 timestamp of report creation.
    pub timestamp: String,
    pub unknowns: usize,
    pub strategy: String,
    pub workers: usize,
    /// Solve time only.
    pub elapsed_seconds: f64,
    /// Wall-clock time from the start of loading to the end of the solve.
    #[serde(default)]
    pub total_elapsed_seconds: f64,
    pub accepted: bool,
    pub tolerance: f64,
    pub max_residual: f64,
    pub worst_equation: Option<usize>,
    pub degenerate_pivots: Vec<usize>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            schema_version: 1,
            job_name: String::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            unknowns: 0,
            strategy: String::new(),
            workers: 1,
            elapsed_seconds: 0.0,
            total_elapsed_seconds: 0.0,
            accepted: false,
            tolerance: 0.0,
            max_residual: 0.0,
            worst_equation: None,
            degenerate_pivots: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }
}

pub fn save_report(path: impl AsRef<Path>, report: &RunReport) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec_pretty(report)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load_report(path: impl AsRef<Path>) -> Result<RunReport> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IoError;

    #[test]
    fn report_survives_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reports").join("run.json");
        let mut metadata = BTreeMap::new();
        metadata.insert("input".to_string(), "a_input_1000.txt".to_string());

        let report = RunReport {
            job_name: "barrier_p4".to_string(),
            unknowns: 1000,
            strategy: "barrier".to_string(),
            workers: 4,
            elapsed_seconds: 0.125,
            total_elapsed_seconds: 0.5,
            accepted: true,
            tolerance: 0.001,
            max_residual: 3.5e-12,
            worst_equation: Some(17),
            degenerate_pivots: vec![3],
            metadata,
            ..Default::default()
        };

        save_report(&path, &report).expect("save should succeed");
        let loaded = load_report(&path).expect("load should succeed");
        assert_eq!(loaded, report);
    }

    #[test]
    fn load_report_fails_for_invalid_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "{invalid json").expect("write invalid payload");
        let err = load_report(&path).expect_err("invalid JSON should fail");
        assert!(matches!(err, IoError::Json(_)));
    }

    #[test]
    fn load_report_fails_for_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_report(dir.path().join("missing.json")).expect_err("missing file");
        match err {
            IoError::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }
}
