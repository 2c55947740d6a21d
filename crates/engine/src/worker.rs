//! Benchmark worker
//!
//! A worker owns one store session and performs its increments strictly
//! sequentially. The first error ends the worker; it is returned in the
//! outcome rather than retried. A panic during an increment is treated the
//! same way, so the increments completed before it are still reported.

use crate::result::WorkerOutcome;
use counterbench_concurrency::{IncrementStats, Strategy};
use counterbench_core::{CounterId, Error, StoreSession};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// One unit of concurrent load
#[derive(Debug, Clone, Copy)]
pub struct Worker {
    id: usize,
    strategy: Strategy,
    counter: CounterId,
    iterations: u64,
}

impl Worker {
    /// Create worker `id` performing `iterations` increments of `counter`
    pub fn new(id: usize, strategy: Strategy, counter: CounterId, iterations: u64) -> Self {
        Self {
            id,
            strategy,
            counter,
            iterations,
        }
    }

    /// Index of the worker within the run
    pub fn id(&self) -> usize {
        self.id
    }

    /// Run every increment on `session`
    pub fn run<S: StoreSession + ?Sized>(&self, session: &mut S) -> WorkerOutcome {
        let started = Instant::now();
        let mut stats = IncrementStats::default();
        let mut error = None;

        for i in 0..self.iterations {
            let step = panic::catch_unwind(AssertUnwindSafe(|| {
                self.strategy.increment(session, self.counter, &mut stats)
            }))
            .unwrap_or_else(|_| Err(Error::WorkerPanicked(self.id)));

            match step {
                Ok(value) => {
                    tracing::trace!(
                        worker_id = self.id,
                        update = i + 1,
                        counter = value,
                        "update applied"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        worker_id = self.id,
                        session = %session.id(),
                        completed = stats.increments,
                        error = %e,
                        "worker failed"
                    );
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let elapsed = started.elapsed();
        tracing::debug!(
            worker_id = self.id,
            strategy = %self.strategy,
            completed = stats.increments,
            conflicts = stats.conflicts,
            elapsed_secs = elapsed.as_secs_f64(),
            "worker completed"
        );

        WorkerOutcome {
            worker_id: self.id,
            completed: stats.increments,
            stats,
            elapsed,
            error,
        }
    }
}
