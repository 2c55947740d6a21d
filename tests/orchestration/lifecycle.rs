//! Reset, measurement and result shape

use crate::common::*;
use counterbench::StoreSession;

#[test]
fn counter_is_reset_before_each_run() {
    let orchestrator = orchestrator(2, 25, 1_000);
    let id = CounterId::default();

    orchestrator.run_kind(StrategyKind::InPlaceAtomic).unwrap();
    assert_eq!(orchestrator.store().committed(id).unwrap().value, 1_050);

    orchestrator.run_kind(StrategyKind::OptimisticCas).unwrap();
    let state = orchestrator.store().committed(id).unwrap();
    assert_eq!(state.value, 1_050);
    assert_eq!(state.version, 50);
}

#[test]
fn counter_persists_after_run() {
    let orchestrator = orchestrator(2, 5, 0);
    orchestrator.run_kind(StrategyKind::PessimisticLock).unwrap();

    let mut session = orchestrator.store().open_session().unwrap();
    assert_eq!(session.read(CounterId::default()).unwrap().value, 10);
}

#[test]
fn result_describes_the_run() {
    let result = orchestrator(3, 20, 7)
        .run_kind(StrategyKind::OptimisticCas)
        .unwrap();

    assert_eq!(result.strategy, StrategyKind::OptimisticCas);
    assert_eq!(result.worker_count, 3);
    assert_eq!(result.iterations_per_worker, 20);
    assert_eq!(result.initial_value, 7);
    assert_eq!(result.expected_value, 67);
    assert_eq!(result.workers.len(), 3);
    for (id, worker) in result.workers.iter().enumerate() {
        assert_eq!(worker.worker_id, id);
        assert!(worker.is_success());
    }
}

#[test]
fn result_serializes_to_json() {
    let result = orchestrator(2, 10, 0)
        .run_kind(StrategyKind::LostUpdate)
        .unwrap();
    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["strategy"], "lost-update");
    assert_eq!(json["expected_value"], 20);
    assert!(json["elapsed"].as_f64().unwrap() >= 0.0);
    assert_eq!(json["workers"].as_array().unwrap().len(), 2);
    assert!(json["workers"][0].get("error").is_none());
}

#[test]
fn each_run_gets_a_fresh_id() {
    let orchestrator = orchestrator(1, 1, 0);
    let a = orchestrator.run_kind(StrategyKind::InPlaceAtomic).unwrap();
    let b = orchestrator.run_kind(StrategyKind::InPlaceAtomic).unwrap();
    assert_ne!(a.run_id, b.run_id);
}
