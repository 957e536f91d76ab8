//! Parallel back-substitution for dense upper-triangular systems.
//!
//! # Architecture
//!
//! ```text
//! TriangularSystem (read-only, shared by reference)
//!         │
//!         ▼
//! BackSubstitutionEngine ── validates 1 <= P <= n
//!         │
//!         ▼
//! SolveStrategy trait
//!    ┌────┼──────────────┐
//!    ▼    ▼              ▼
//! Seq.  Barrier      DependencyCounter
//!       (Collective)  (per-worker inboxes)
//!         │
//!         ▼
//! WorkerPartition (running sums of owned rows only)
//! ```
//!
//! The harness times one engine call and the verifier checks residuals
//! against the benchmark's absolute tolerance.

pub mod collective;
pub mod config;
pub mod engine;
pub mod error;
pub mod harness;
pub mod partition;
mod solution;
pub mod strategy;
pub mod verify;

pub use collective::{Collective, ThreadCollective};
pub use config::{ParseStrategyError, SolverConfig, Strategy};
pub use engine::{BackSubstitutionEngine, solve, validate_worker_count};
pub use error::{CollectiveError, CollectiveOp, Result, SolveError};
pub use harness::{StrategyComparison, TimedSolve, build_report, compare_strategies, run};
pub use partition::{PivotOutcome, WorkerPartition};
pub use solution::{Solution, SolveStats, WorkerOutput};
pub use strategy::{
    BarrierStrategy, DependencyCounterStrategy, SequentialStrategy, SolveStrategy,
};
pub use verify::{DEFAULT_TOLERANCE, VerificationReport, verify};
