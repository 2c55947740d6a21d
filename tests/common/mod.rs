//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

pub use counterbench::{
    BackingStore, BenchmarkConfig, CounterId, IncrementStats, MemoryStore, Orchestrator, Strategy,
    StrategyKind,
};

/// Strategies that must always reach `initial + N * M`
pub const CORRECT_STRATEGIES: [StrategyKind; 3] = [
    StrategyKind::InPlaceAtomic,
    StrategyKind::PessimisticLock,
    StrategyKind::OptimisticCas,
];

/// Config for N workers doing M increments from `initial`
pub fn config(workers: usize, iterations: u64, initial: i64) -> BenchmarkConfig {
    BenchmarkConfig {
        workers,
        iterations,
        initial_value: initial,
        ..BenchmarkConfig::default()
    }
}

/// Orchestrator over a fresh memory store
pub fn orchestrator(workers: usize, iterations: u64, initial: i64) -> Orchestrator<MemoryStore> {
    let config = config(workers, iterations, initial);
    let store = MemoryStore::with_config(config.store_config());
    Orchestrator::new(store, config).unwrap()
}

/// Orchestrator over a memory store that sleeps `latency` before every op
pub fn orchestrator_with_latency(
    workers: usize,
    iterations: u64,
    initial: i64,
    latency: Duration,
) -> Orchestrator<MemoryStore> {
    let config = BenchmarkConfig {
        op_latency_us: latency.as_micros() as u64,
        ..config(workers, iterations, initial)
    };
    let store = MemoryStore::with_config(config.store_config());
    Orchestrator::new(store, config).unwrap()
}

/// Drive `strategy` directly from `workers` threads and return every value
/// written, so tests can reason about individual increments.
pub fn written_values(
    store: &MemoryStore,
    strategy: Strategy,
    workers: usize,
    iterations: u64,
) -> (Vec<i64>, IncrementStats) {
    let id = CounterId::default();
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let mut session = store.open_session().unwrap();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut stats = IncrementStats::default();
                barrier.wait();
                let values: Vec<i64> = (0..iterations)
                    .map(|_| strategy.increment(&mut session, id, &mut stats).unwrap())
                    .collect();
                (values, stats)
            })
        })
        .collect();

    let mut all = Vec::new();
    let mut totals = IncrementStats::default();
    for handle in handles {
        let (values, stats) = handle.join().unwrap();
        all.extend(values);
        totals += stats;
    }
    all.sort_unstable();
    (all, totals)
}
