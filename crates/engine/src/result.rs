//! Outcome of a benchmark run
//!
//! `RunResult` is produced once by the orchestrator after every worker has
//! joined and the final value has been read. It carries raw observations only;
//! derived metrics live in `report`.
//!
//! If the final read fails the result is still produced, with no observed
//! value and the read error recorded, so worker outcomes are never lost.

use chrono::{DateTime, Utc};
use counterbench_concurrency::{IncrementStats, StrategyKind};
use counterbench_core::RunId;
use serde::{Serialize, Serializer};
use std::time::Duration;

fn as_secs_f64<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// What one worker did before it finished or failed
#[derive(Debug, Clone, Serialize)]
pub struct WorkerOutcome {
    /// Index of the worker within the run
    pub worker_id: usize,
    /// Increments completed (equal to the configured iterations on success)
    pub completed: u64,
    /// Attempts and conflicts
    pub stats: IncrementStats,
    /// Wall-clock time spent by the worker, in seconds
    #[serde(serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    /// Error that ended the worker early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerOutcome {
    /// Outcome of a worker that never ran
    pub(crate) fn failed_to_start(worker_id: usize, error: String) -> Self {
        Self {
            worker_id,
            completed: 0,
            stats: IncrementStats::default(),
            elapsed: Duration::ZERO,
            error: Some(error),
        }
    }

    /// Outcome of a worker thread that unwound outside `Worker::run`
    ///
    /// Panics raised by a strategy or session are caught inside
    /// `Worker::run`, which keeps the increments completed before the panic.
    /// Only a panic past that point lands here, and its progress is unknown.
    pub(crate) fn panicked(worker_id: usize, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::failed_to_start(worker_id, String::new())
        }
    }

    /// True if the worker finished every increment
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Raw result of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Unique id of this run
    pub run_id: RunId,
    /// Strategy under test
    pub strategy: StrategyKind,
    /// Concurrent workers (N)
    pub worker_count: usize,
    /// Increments per worker (M)
    pub iterations_per_worker: u64,
    /// Counter value at reset
    pub initial_value: i64,
    /// Wall-clock start of the measured section
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration from first spawn to last join, in seconds
    #[serde(serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    /// `initial_value + N * M`
    pub expected_value: i64,
    /// Value read after every worker joined (None if the read failed)
    pub observed_value: Option<i64>,
    /// Version read after every worker joined (None if the read failed)
    pub observed_version: Option<u64>,
    /// Error of the final read, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_read_error: Option<String>,
    /// Per-worker outcomes, ordered by worker id
    pub workers: Vec<WorkerOutcome>,
}

impl RunResult {
    /// Attempts and conflicts summed over every worker
    pub fn total_stats(&self) -> IncrementStats {
        self.workers.iter().map(|w| w.stats).sum()
    }

    /// Workers that ended with an error
    pub fn failed_workers(&self) -> impl Iterator<Item = &WorkerOutcome> {
        self.workers.iter().filter(|w| !w.is_success())
    }

    /// True if the observed value equals the expected value
    pub fn is_exact(&self) -> bool {
        self.observed_value == Some(self.expected_value)
    }
}
