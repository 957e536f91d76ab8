//! TOML job files for `trisolve run`.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Deserialize;
use trisolve_io::SystemPaths;
use trisolve_solver::SolverConfig;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the three system files live.
///
/// `dir` supplies default file names; explicit paths override them.
#[derive(Debug, Default, Deserialize)]
pub struct InputConfig {
    pub dir: Option<PathBuf>,
    pub unknowns: Option<PathBuf>,
    pub coefficients: Option<PathBuf>,
    pub free_terms: Option<PathBuf>,
}

impl InputConfig {
    pub fn resolve(&self) -> anyhow::Result<SystemPaths> {
        let defaults = self.dir.as_ref().map(SystemPaths::in_dir);
        let pick = |explicit: &Option<PathBuf>, fallback: Option<&PathBuf>, what: &str| {
            explicit
                .clone()
                .or_else(|| fallback.cloned())
                .with_context(|| format!("no {what} file given (set a directory or the file path)"))
        };
        Ok(SystemPaths::new(
            pick(
                &self.unknowns,
                defaults.as_ref().map(|d| &d.unknown_count),
                "unknown count",
            )?,
            pick(
                &self.coefficients,
                defaults.as_ref().map(|d| &d.coefficients),
                "coefficient",
            )?,
            pick(
                &self.free_terms,
                defaults.as_ref().map(|d| &d.free_terms),
                "free term",
            )?,
        ))
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Job name recorded in the report (default: "trisolve").
    #[serde(default = "default_job_name")]
    pub job_name: String,
    /// Optional path of the JSON run report.
    #[serde(default)]
    pub report: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            job_name: default_job_name(),
            report: None,
        }
    }
}

fn default_job_name() -> String {
    "trisolve".into()
}

/// Load and validate a job file. Relative input and report paths are
/// resolved against the job file's directory.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read job file {}", path.display()))?;
    let mut job: JobConfig =
        toml::from_str(&raw).with_context(|| format!("invalid job file {}", path.display()))?;

    if job.solver.workers == 0 {
        bail!("solver.workers must be at least 1");
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for slot in [
        &mut job.input.dir,
        &mut job.input.unknowns,
        &mut job.input.coefficients,
        &mut job.input.free_terms,
        &mut job.output.report,
    ] {
        if let Some(p) = slot
            && p.is_relative()
        {
            *p = base.join(&*p);
        }
    }
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use trisolve_solver::Strategy;

    #[test]
    fn job_file_fills_defaults_and_resolves_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let job_path = dir.path().join("job.toml");
        std::fs::write(
            &job_path,
            r#"
[input]
dir = "data"
free_terms = "/abs/free.txt"

[solver]
workers = 4
strategy = "dependency-counter"
step_timeout_ms = 1500
"#,
        )
        .unwrap();

        let job = load_config(&job_path).expect("valid job");
        assert_eq!(job.solver.workers, 4);
        assert_eq!(job.solver.strategy, Strategy::DependencyCounter);
        assert_eq!(job.solver.step_timeout, Duration::from_millis(1500));
        assert_eq!(job.output.job_name, "trisolve");
        assert!(job.output.report.is_none());

        let paths = job.input.resolve().expect("paths");
        assert_eq!(paths.coefficients, dir.path().join("data").join("a_input.txt"));
        assert_eq!(paths.free_terms, PathBuf::from("/abs/free.txt"));
    }

    #[test]
    fn missing_input_location_is_reported() {
        let input = InputConfig {
            unknowns: Some("n.txt".into()),
            ..Default::default()
        };
        let err = input.resolve().expect_err("coefficients missing");
        assert!(err.to_string().contains("coefficient"), "{err}");
    }

    #[test]
    fn zero_workers_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let job_path = dir.path().join("job.toml");
        std::fs::write(&job_path, "[input]\ndir = \".\"\n[solver]\nworkers = 0\n").unwrap();
        assert!(load_config(&job_path).is_err());
    }
}
