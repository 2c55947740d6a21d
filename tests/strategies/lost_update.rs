//! The unsafe strategy never overshoots and loses updates once writers overlap

use crate::common::*;
use counterbench::{RunReport, StoreConfig, Verdict};
use std::time::Duration;

#[test]
fn lost_update_never_exceeds_expected() {
    for _ in 0..3 {
        let result = orchestrator(8, 300, 5)
            .run_kind(StrategyKind::LostUpdate)
            .unwrap();
        let observed = result.observed_value.unwrap();
        assert!(observed <= result.expected_value);
        assert!(observed > 5);
    }
}

#[test]
fn lost_update_loses_increments_under_latency() {
    // 200us between every read and its write: overlapping workers are
    // all but certain to read the same value.
    let result = orchestrator_with_latency(8, 100, 0, Duration::from_micros(200))
        .run_kind(StrategyKind::LostUpdate)
        .unwrap();
    let observed = result.observed_value.unwrap();
    assert!(
        observed < result.expected_value,
        "observed {} expected {}",
        observed,
        result.expected_value
    );

    let report = RunReport::from_result(&result);
    assert_eq!(report.verdict, Verdict::ExpectedLoss);
    assert!(report.lost_updates > 0);
    // Every worker still believes it completed every update
    assert_eq!(result.total_stats().increments, 800);
}

#[test]
fn lost_update_is_exact_with_a_single_worker() {
    let result = orchestrator(1, 1_000, 0)
        .run_kind(StrategyKind::LostUpdate)
        .unwrap();
    assert_eq!(result.observed_value, Some(1_000));
}

#[test]
fn lost_update_workers_see_duplicate_values() {
    let store = MemoryStore::with_config(
        StoreConfig::default().with_op_latency(Duration::from_micros(200)),
    );
    store.reset_counter(CounterId::default(), 0).unwrap();
    let (written, _) = written_values(&store, Strategy::LostUpdate, 4, 50);

    let mut distinct = written.clone();
    distinct.dedup();
    assert!(distinct.len() < written.len());
}
