//! counterbench - concurrency-control strategies on a contended counter
//!
//! N workers each perform M increments of one shared counter row, using one
//! of four strategies, and the final value is compared against
//! `initial + N * M`:
//!
//! - **Lost update**: read, add one, write back. Loses increments.
//! - **In-place atomic**: the store increments the row itself.
//! - **Pessimistic lock**: exclusive row lock around read-modify-write.
//! - **Optimistic CAS**: version-checked write, retried on conflict.
//!
//! # Quick Start
//!
//! ```no_run
//! use counterbench::{BenchmarkConfig, MemoryStore, Orchestrator, RunReport, StrategyKind};
//!
//! let config = BenchmarkConfig { workers: 4, iterations: 1_000, ..Default::default() };
//! let orchestrator = Orchestrator::new(MemoryStore::new(), config)?;
//! let result = orchestrator.run_kind(StrategyKind::OptimisticCas)?;
//! println!("{}", RunReport::from_result(&result));
//! # Ok::<(), counterbench::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `counterbench-core`: types, errors, backing store contract
//! - `counterbench-storage`: in-process transactional row store
//! - `counterbench-concurrency`: the four strategies and retry policy
//! - `counterbench-engine`: workers, orchestrator, config, reports

pub use counterbench_concurrency::{IncrementStats, RetryPolicy, Strategy, StrategyKind};
pub use counterbench_core::{
    BackingStore, CounterId, CounterState, Error, Result, RunId, SessionId, StoreSession,
};
pub use counterbench_engine::{
    render_comparison, BenchmarkConfig, Orchestrator, RetryConfig, RunReport, RunResult, Verdict,
    Worker, WorkerOutcome,
};
pub use counterbench_storage::{MemorySession, MemoryStore, StatsSnapshot, StoreConfig};
