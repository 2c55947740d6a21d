//! Row locking serializes every critical section

use crate::common::*;
use counterbench::{StoreConfig, StoreSession};
use std::time::Duration;

#[test]
fn no_two_workers_observe_the_same_value() {
    let store = MemoryStore::with_config(
        StoreConfig::default().with_op_latency(Duration::from_micros(10)),
    );
    store.reset_counter(CounterId::default(), 0).unwrap();

    let (written, stats) = written_values(&store, Strategy::PessimisticLock, 6, 50);

    // Values written are exactly 1..=300, each once
    let expected: Vec<i64> = (1..=300).collect();
    assert_eq!(written, expected);
    assert_eq!(stats.conflicts, 0);

    let store_stats = store.stats();
    assert_eq!(store_stats.lock_acquisitions, 300);
    assert_eq!(store_stats.commits, 300);
}

#[test]
fn lock_is_released_after_each_increment() {
    let orchestrator = orchestrator(4, 100, 0);
    orchestrator
        .run_kind(StrategyKind::PessimisticLock)
        .unwrap();

    let mut session = orchestrator.store().open_session().unwrap();
    session.lock_exclusive(CounterId::default()).unwrap();
    session.commit().unwrap();
}

#[test]
fn lock_timeout_is_reported_per_worker() {
    let store = MemoryStore::with_config(
        StoreConfig::default().with_lock_timeout(Duration::from_millis(20)),
    );
    let id = CounterId::default();
    store.reset_counter(id, 0).unwrap();

    // An outside session holds the lock for the whole run
    let mut blocker = store.open_session().unwrap();
    blocker.lock_exclusive(id).unwrap();

    let mut session = store.open_session().unwrap();
    let mut stats = IncrementStats::default();
    let err = Strategy::PessimisticLock
        .increment(&mut session, id, &mut stats)
        .unwrap_err();
    assert!(matches!(err, counterbench::Error::LockTimeout { .. }));
    assert_eq!(stats.increments, 0);

    blocker.commit().unwrap();
    Strategy::PessimisticLock
        .increment(&mut session, id, &mut stats)
        .unwrap();
    assert_eq!(store.committed(id).unwrap().value, 1);
}
