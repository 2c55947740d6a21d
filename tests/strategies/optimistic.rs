//! Optimistic compare-and-swap accounting

use crate::common::*;
use counterbench::{RetryPolicy, StoreConfig};
use std::time::Duration;

#[test]
fn successful_cas_count_equals_total_increments() {
    let orchestrator = orchestrator_with_latency(6, 50, 0, Duration::from_micros(20));
    let result = orchestrator.run_kind(StrategyKind::OptimisticCas).unwrap();
    let stats = orchestrator.store().stats();
    let totals = result.total_stats();

    assert_eq!(result.observed_value, Some(300));
    assert_eq!(stats.cas_successes, 300);
    assert!(stats.cas_attempts() >= 300);
    assert_eq!(totals.attempts, stats.cas_attempts());
    assert_eq!(totals.conflicts, stats.cas_conflicts);
    assert_eq!(totals.attempts, totals.increments + totals.conflicts);
    // One version bump per successful write
    assert_eq!(result.observed_version, Some(300));
}

#[test]
fn written_values_are_a_total_order() {
    let store = MemoryStore::with_config(
        StoreConfig::default().with_op_latency(Duration::from_micros(10)),
    );
    store.reset_counter(CounterId::default(), 0).unwrap();

    let strategy = Strategy::OptimisticCas(RetryPolicy::unbounded());
    let (written, stats) = written_values(&store, strategy, 4, 50);

    let expected: Vec<i64> = (1..=200).collect();
    assert_eq!(written, expected);
    assert_eq!(stats.attempts, 200 + stats.conflicts);
}

#[test]
fn exhausted_retries_fail_the_worker_not_the_run() {
    // One attempt per increment: any conflict ends that worker. 200us between
    // each read and its CAS makes overlapping workers conflict.
    let mut bench = config(8, 40, 0);
    bench.op_latency_us = 200;
    bench.retry.max_attempts = 1;
    let store = MemoryStore::with_config(bench.store_config());
    let orchestrator = Orchestrator::new(store, bench).unwrap();

    let result = orchestrator.run_kind(StrategyKind::OptimisticCas).unwrap();
    assert!(result.failed_workers().count() > 0);
    assert!(result.total_stats().conflicts > 0);
    for failed in result.failed_workers() {
        assert!(failed.error.as_deref().unwrap().contains("Retry exhausted"));
        assert!(failed.completed < 40);
    }
    // Whatever completed is counted exactly once
    assert_eq!(
        result.observed_value,
        Some(result.total_stats().increments as i64)
    );
}
