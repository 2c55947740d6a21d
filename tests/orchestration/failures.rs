//! Worker failures are isolated; an unreachable store fails the run

use crate::common::*;
use counterbench::{RunReport, Verdict};

#[test]
fn unreachable_store_fails_every_strategy() {
    for kind in StrategyKind::ALL {
        let orchestrator = orchestrator(3, 10, 0);
        orchestrator.store().disconnect();
        let err = orchestrator.run_kind(kind).unwrap_err();
        assert!(err.is_connection(), "{}", kind);
    }
}

#[test]
fn broken_session_fails_only_its_worker() {
    for kind in CORRECT_STRATEGIES {
        let orchestrator = orchestrator(4, 50, 0);
        // Sessions are opened in worker order; break worker 2 early
        orchestrator.store().fail_session_after(2, 10);

        let result = orchestrator.run_kind(kind).unwrap();
        let failed: Vec<usize> = result.failed_workers().map(|w| w.worker_id).collect();
        assert_eq!(failed, vec![2], "{}", kind);

        let broken = &result.workers[2];
        assert!(broken.error.as_deref().unwrap().contains("Connection error"));
        assert!(broken.completed < 50);

        for (id, worker) in result.workers.iter().enumerate() {
            if id != 2 {
                assert_eq!(worker.completed, 50);
            }
        }

        // Every completed increment is in the counter, nothing more
        assert_eq!(
            result.observed_value,
            Some(result.total_stats().increments as i64),
            "{}",
            kind
        );
        assert_eq!(RunReport::from_result(&result).verdict, Verdict::Incomplete);
    }
}

#[test]
fn broken_lock_holder_does_not_wedge_siblings() {
    let orchestrator = orchestrator(3, 30, 0);
    // Fails inside the critical section (lock, read, then write)
    orchestrator.store().fail_session_after(0, 2);

    let result = orchestrator
        .run_kind(StrategyKind::PessimisticLock)
        .unwrap();
    assert_eq!(result.workers[0].completed, 0);
    assert_eq!(result.workers[1].completed, 30);
    assert_eq!(result.workers[2].completed, 30);
    assert_eq!(result.observed_value, Some(60));
}

#[test]
fn failed_final_read_still_reports_every_worker() {
    for kind in StrategyKind::ALL {
        let orchestrator = orchestrator(3, 10, 0);
        // Workers hold sessions 0..3; the final read opens session 3
        orchestrator.store().fail_session_after(3, 0);

        let result = orchestrator.run_kind(kind).unwrap();
        assert_eq!(result.observed_value, None, "{}", kind);
        assert!(result.final_read_error.is_some());
        assert_eq!(result.workers.len(), 3);
        assert!(result.workers.iter().all(|w| w.completed == 10));
        assert_eq!(RunReport::from_result(&result).verdict, Verdict::Unobserved);
    }
}
