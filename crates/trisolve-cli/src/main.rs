//! trisolve command-line interface.
//!
//! ```sh
//! trisolve generate 2000 --out data/
//! trisolve solve --dir data/ --workers 8 --strategy dependency-counter
//! trisolve compare --dir data/ --workers 8
//! trisolve run job.toml
//! ```

mod config;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use trisolve_io::SystemPaths;
use trisolve_solver::{SolverConfig, Strategy};

#[derive(Parser)]
#[command(name = "trisolve")]
#[command(about = "Parallel back-substitution for upper-triangular systems")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random, well-conditioned system and write its three input files.
    Generate {
        /// Number of unknowns.
        n: usize,
        /// Output directory.
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Solve one system, verify the residuals and print timing.
    Solve {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
        /// sequential, barrier or dependency-counter.
        #[arg(short, long, default_value = "barrier")]
        strategy: Strategy,
        /// Per-step coordination timeout in milliseconds.
        #[arg(long, default_value_t = 30_000)]
        timeout_ms: u64,
        /// Write a JSON run report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long, default_value = "trisolve")]
        job_name: String,
    },
    /// Solve with every strategy and compare the results.
    Compare {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long, default_value_t = 1)]
        workers: usize,
        #[arg(long, default_value_t = 30_000)]
        timeout_ms: u64,
    },
    /// Run a job described by a TOML file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Report path (overrides the job file).
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Check a job file and its input files without solving.
    Validate {
        config: PathBuf,
    },
}

/// Input file locations. `--dir` supplies the default file names.
#[derive(Args)]
struct InputArgs {
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,
    #[arg(long)]
    unknowns: Option<PathBuf>,
    #[arg(long)]
    coefficients: Option<PathBuf>,
    #[arg(long)]
    free_terms: Option<PathBuf>,
}

impl InputArgs {
    fn paths(self) -> SystemPaths {
        let defaults = SystemPaths::in_dir(&self.dir);
        SystemPaths::new(
            self.unknowns.unwrap_or(defaults.unknown_count),
            self.coefficients.unwrap_or(defaults.coefficients),
            self.free_terms.unwrap_or(defaults.free_terms),
        )
    }
}

/// Returns whether the produced solution(s) passed verification.
fn dispatch(command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::Generate { n, out, seed } => {
            runner::generate(n, seed, &out)?;
            Ok(true)
        }
        Commands::Solve {
            input,
            workers,
            strategy,
            timeout_ms,
            report,
            job_name,
        } => {
            let paths = input.paths();
            let started = Instant::now();
            let system = runner::load_system(&paths)?;
            let config = SolverConfig {
                workers,
                strategy,
                step_timeout: Duration::from_millis(timeout_ms),
            };
            let report = runner::solve_and_report(
                &system,
                &config,
                started,
                &job_name,
                report.as_deref(),
                runner::input_metadata(&paths),
            )?;
            Ok(report.accepted)
        }
        Commands::Compare {
            input,
            workers,
            timeout_ms,
        } => {
            let system = runner::load_system(&input.paths())?;
            runner::compare(&system, workers, Duration::from_millis(timeout_ms))
        }
        Commands::Run {
            config: job_path,
            report,
        } => {
            let job = config::load_config(&job_path)?;
            println!("job: {}", job_path.display());
            let paths = job.input.resolve()?;
            let started = Instant::now();
            let system = runner::load_system(&paths)?;
            let report_path = report.or(job.output.report);
            let report = runner::solve_and_report(
                &system,
                &job.solver,
                started,
                &job.output.job_name,
                report_path.as_deref(),
                runner::input_metadata(&paths),
            )?;
            Ok(report.accepted)
        }
        Commands::Validate { config: job_path } => {
            let job = config::load_config(&job_path)?;
            runner::validate_job(&job)?;
            println!("solver: {}", serde_json::to_string(&job.solver)?);
            println!("job file is valid");
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match dispatch(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("verification failed: residual above tolerance");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
