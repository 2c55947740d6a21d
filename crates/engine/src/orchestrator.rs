//! Benchmark orchestration
//!
//! ## Run sequence
//!
//! ```text
//! 1. ping()            - store must be reachable, otherwise the run fails
//! 2. reset_counter()   - value = initial, version = 0
//! 3. open_session() xN - one dedicated session per worker
//! 4. start timer, spawn N worker threads
//! 5. join all workers  - failures are recorded, never retried
//! 6. stop timer
//! 7. read()            - final value on a fresh session
//! 8. RunResult
//! ```
//!
//! Workers are spawned one after another with no start barrier, so a failed
//! spawn never leaves its siblings waiting. A worker whose session cannot be
//! opened, that hits a store error, or that panics is reported as failed; the
//! remaining workers run to completion. A failed final read is recorded in the
//! result instead of discarding the worker outcomes.

use crate::config::BenchmarkConfig;
use crate::result::{RunResult, WorkerOutcome};
use crate::worker::Worker;
use chrono::Utc;
use counterbench_concurrency::{Strategy, StrategyKind};
use counterbench_core::{BackingStore, Error, Result, RunId, StoreSession};
use std::thread;
use std::time::Instant;

/// Drives benchmark runs against a backing store
#[derive(Debug)]
pub struct Orchestrator<S: BackingStore> {
    store: S,
    config: BenchmarkConfig,
}

impl<S: BackingStore> Orchestrator<S> {
    /// Create an orchestrator
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn new(store: S, config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The store runs are executed against
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configuration used for every run
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Strategy for `kind`, parameterized from the config
    pub fn strategy(&self, kind: StrategyKind) -> Strategy {
        Strategy::from_kind(kind, self.config.retry_policy())
    }

    /// Run the benchmark for one strategy kind
    pub fn run_kind(&self, kind: StrategyKind) -> Result<RunResult> {
        self.run(self.strategy(kind))
    }

    /// Run the benchmark with `strategy`
    ///
    /// # Errors
    ///
    /// Fails only if the store cannot be reached at the start or the counter
    /// cannot be reset. Worker failures and a failed final read are part of
    /// the returned result.
    pub fn run(&self, strategy: Strategy) -> Result<RunResult> {
        let config = &self.config;
        let counter = config.counter();
        let run_id = RunId::new();

        self.store.ping()?;
        self.store.reset_counter(counter, config.initial_value)?;

        tracing::info!(
            %run_id,
            %strategy,
            workers = config.workers,
            iterations = config.iterations,
            initial_value = config.initial_value,
            "starting run"
        );

        let sessions: Vec<Result<S::Session>> =
            (0..config.workers).map(|_| self.store.open_session()).collect();

        let started_at = Utc::now();
        let started = Instant::now();
        let workers = self.spawn_and_join(strategy, sessions);
        let elapsed = started.elapsed();

        let final_read = self
            .store
            .open_session()
            .and_then(|mut session| session.read(counter));
        let (final_state, final_read_error) = match final_read {
            Ok(state) => (Some(state), None),
            Err(e) => {
                tracing::error!(%run_id, error = %e, "final read failed");
                (None, Some(e.to_string()))
            }
        };

        let result = RunResult {
            run_id,
            strategy: strategy.kind(),
            worker_count: config.workers,
            iterations_per_worker: config.iterations,
            initial_value: config.initial_value,
            started_at,
            elapsed,
            expected_value: config.expected_value(),
            observed_value: final_state.map(|state| state.value),
            observed_version: final_state.map(|state| state.version),
            final_read_error,
            workers,
        };

        tracing::info!(
            %run_id,
            %strategy,
            elapsed_secs = elapsed.as_secs_f64(),
            observed = ?result.observed_value,
            expected = result.expected_value,
            failed_workers = result.failed_workers().count(),
            "run completed"
        );
        Ok(result)
    }

    fn spawn_and_join(
        &self,
        strategy: Strategy,
        sessions: Vec<Result<S::Session>>,
    ) -> Vec<WorkerOutcome> {
        let counter = self.config.counter();
        let iterations = self.config.iterations;

        thread::scope(|scope| {
            let handles: Vec<_> = sessions
                .into_iter()
                .enumerate()
                .map(|(worker_id, session)| {
                    let mut session = match session {
                        Ok(session) => session,
                        Err(e) => {
                            tracing::error!(worker_id, error = %e, "could not open session");
                            return Err(WorkerOutcome::failed_to_start(worker_id, e.to_string()));
                        }
                    };
                    let worker = Worker::new(worker_id, strategy, counter, iterations);
                    thread::Builder::new()
                        .name(format!("worker-{}", worker.id()))
                        .spawn_scoped(scope, move || worker.run(&mut session))
                        .map(|handle| (worker_id, handle))
                        .map_err(|e| {
                            WorkerOutcome::failed_to_start(worker_id, Error::from(e).to_string())
                        })
                })
                .collect();

            handles
                .into_iter()
                .map(|spawned| match spawned {
                    Ok((worker_id, handle)) => handle.join().unwrap_or_else(|_| {
                        tracing::error!(worker_id, "worker panicked");
                        WorkerOutcome::panicked(worker_id, Error::WorkerPanicked(worker_id).to_string())
                    }),
                    Err(outcome) => outcome,
                })
                .collect()
        })
    }
}
