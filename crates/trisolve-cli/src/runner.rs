//! Command implementations behind the CLI.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use trisolve_io::{
    RunReport, SystemPaths, generate_system, read_system, save_report, write_system,
};
use trisolve_model::{SystemSummary, TriangularSystem};
use trisolve_solver::{
    DEFAULT_TOLERANCE, SolverConfig, build_report, compare_strategies, run, validate_worker_count,
    verify,
};

use crate::config::JobConfig;

pub fn load_system(paths: &SystemPaths) -> anyhow::Result<TriangularSystem> {
    let system = read_system(paths)
        .with_context(|| format!("failed to load system from {}", paths.coefficients.display()))?;
    print_summary(&SystemSummary::from_system(&system));
    Ok(system)
}

pub fn print_summary(summary: &SystemSummary) {
    println!("unknowns: {}", summary.unknowns);
    println!("stored_entries: {}", summary.stored_entries);
    println!("zero_pivots: {}", summary.zero_pivots);
    println!("min_abs_pivot: {:e}", summary.min_abs_pivot);
    println!("max_abs_pivot: {:e}", summary.max_abs_pivot);
}

pub fn generate(n: usize, seed: u64, out: &Path) -> anyhow::Result<SystemPaths> {
    let system = generate_system(n, seed).context("failed to generate system")?;
    let paths = SystemPaths::in_dir(out);
    write_system(&system, &paths)
        .with_context(|| format!("failed to write system to {}", out.display()))?;
    println!("generated: {n} unknowns (seed {seed})");
    println!("unknown_count_file: {}", paths.unknown_count.display());
    println!("coefficients_file: {}", paths.coefficients.display());
    println!("free_terms_file: {}", paths.free_terms.display());
    Ok(paths)
}

/// Solve once, verify, print the outcome and optionally persist a report.
///
/// `started` marks the beginning of loading; the total time runs from it to
/// the end of the solve.
pub fn solve_and_report(
    system: &TriangularSystem,
    config: &SolverConfig,
    started: Instant,
    job_name: &str,
    report_path: Option<&Path>,
    metadata: BTreeMap<String, String>,
) -> anyhow::Result<RunReport> {
    let timed = run(system, config).context("solve failed")?;
    let total = started.elapsed();
    let verification = verify(system, timed.solution.as_slice(), DEFAULT_TOLERANCE);
    let mut report = build_report(job_name, system, config, &timed, &verification, metadata);
    report.total_elapsed_seconds = total.as_secs_f64();

    println!("strategy: {}", report.strategy);
    println!("workers: {}", report.workers);
    println!("execution_elapsed_time: {:.6}", report.elapsed_seconds);
    println!("total_elapsed_time: {:.6}", report.total_elapsed_seconds);
    println!("barriers: {}", timed.solution.stats.barriers);
    println!("messages: {}", timed.solution.stats.messages);
    if !report.degenerate_pivots.is_empty() {
        println!("degenerate_pivots: {}", join(&report.degenerate_pivots));
    }
    println!("max_residual: {:e}", report.max_residual);
    println!("solution_is_correct: {}", report.accepted);

    if let Some(path) = report_path {
        save_report(path, &report)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("report: {}", path.display());
    }
    Ok(report)
}

/// Load the job's system and check the solver settings against it, exactly
/// as `run` would before solving.
pub fn validate_job(job: &JobConfig) -> anyhow::Result<TriangularSystem> {
    let paths = job.input.resolve()?;
    let system = load_system(&paths)?;
    validate_worker_count(job.solver.strategy, job.solver.workers, system.n())
        .context("invalid solver settings")?;
    Ok(system)
}

pub fn compare(
    system: &TriangularSystem,
    workers: usize,
    step_timeout: Duration,
) -> anyhow::Result<bool> {
    let comparison = compare_strategies(system, workers, step_timeout).context("comparison failed")?;
    let mut all_accepted = true;
    for (config, timed) in &comparison.runs {
        let verification = verify(system, timed.solution.as_slice(), DEFAULT_TOLERANCE);
        all_accepted &= verification.accepted;
        println!(
            "{:<20} workers={:<4} elapsed={:.6}s accepted={}",
            config.strategy.to_string(),
            config.workers,
            timed.elapsed.as_secs_f64(),
            verification.accepted
        );
    }
    println!("max_deviation: {:e}", comparison.max_deviation);
    Ok(all_accepted)
}

/// Metadata recorded in reports: where the input came from.
pub fn input_metadata(paths: &SystemPaths) -> BTreeMap<String, String> {
    let entries: [(&str, &PathBuf); 3] = [
        ("unknown_count_file", &paths.unknown_count),
        ("coefficients_file", &paths.coefficients),
        ("free_terms_file", &paths.free_terms),
    ];
    entries
        .into_iter()
        .map(|(key, path)| (key.to_string(), path.display().to_string()))
        .collect()
}

fn join(rows: &[usize]) -> String {
    rows.iter().map(usize::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use trisolve_io::load_report;
    use trisolve_solver::Strategy;

    #[test]
    fn generated_system_solves_and_reports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SolverConfig {
            workers: 4,
            strategy: Strategy::Barrier,
            ..Default::default()
        };
        let report_path = dir.path().join("out").join("report.json");
        let started = Instant::now();
        let paths = generate(40, 5, dir.path()).expect("generate");
        let system = load_system(&paths).expect("load");
        let report = solve_and_report(
            &system,
            &config,
            started,
            "cli_test",
            Some(&report_path),
            input_metadata(&paths),
        )
        .expect("solve");

        assert!(report.accepted);
        assert!(report.total_elapsed_seconds >= report.elapsed_seconds);
        let loaded = load_report(&report_path).expect("report written");
        assert_eq!(loaded.job_name, "cli_test");
        assert_eq!(loaded.unknowns, 40);
        assert!((loaded.total_elapsed_seconds - report.total_elapsed_seconds).abs() < 1e-9);
        assert_eq!(
            loaded.metadata.get("coefficients_file"),
            Some(&paths.coefficients.display().to_string())
        );
    }

    #[test]
    fn compare_accepts_generated_system() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = generate(30, 9, dir.path()).expect("generate");
        let system = load_system(&paths).expect("load");
        assert!(compare(&system, 3, Duration::from_secs(10)).expect("compare"));
    }

    #[test]
    fn too_many_workers_fails_with_context() {
        let system = generate_system(3, 1).expect("generate");
        let config = SolverConfig {
            workers: 8,
            ..Default::default()
        };
        let err = solve_and_report(&system, &config, Instant::now(), "x", None, BTreeMap::new())
            .expect_err("P > n");
        assert!(format!("{err:#}").contains("invalid worker count"), "{err:#}");
    }

    fn job_for(dir: &Path, strategy: Strategy, workers: usize) -> JobConfig {
        generate(3, 4, dir).expect("generate");
        let job_path = dir.join("job.toml");
        std::fs::write(
            &job_path,
            format!("[input]\ndir = \".\"\n[solver]\nworkers = {workers}\nstrategy = \"{strategy}\"\n"),
        )
        .expect("write job");
        crate::config::load_config(&job_path).expect("job parses")
    }

    #[test]
    fn validate_applies_the_engine_worker_rules() {
        let dir = tempfile::tempdir().expect("tempdir");

        let job = job_for(dir.path(), Strategy::Sequential, 2);
        let err = validate_job(&job).expect_err("sequential runs on one worker");
        assert!(format!("{err:#}").contains("exactly one worker"), "{err:#}");

        let job = job_for(dir.path(), Strategy::Barrier, 4);
        assert!(validate_job(&job).is_err(), "more workers than unknowns");

        let job = job_for(dir.path(), Strategy::DependencyCounter, 3);
        assert_eq!(validate_job(&job).expect("valid job").n(), 3);
    }
}
