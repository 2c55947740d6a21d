//! Benchmark engine for counterbench
//!
//! This crate drives runs and turns them into results:
//! - BenchmarkConfig: defaults, `counterbench.toml`, environment overrides
//! - Worker: one session, M sequential increments
//! - Orchestrator: reset, spawn N workers, join, final read
//! - RunResult / RunReport: raw observations and derived metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod orchestrator;
pub mod report;
pub mod result;
pub mod worker;

pub use config::{BenchmarkConfig, RetryConfig};
pub use orchestrator::Orchestrator;
pub use report::{render_comparison, RunReport, Verdict};
pub use result::{RunResult, WorkerOutcome};
pub use worker::Worker;
