//! Operation counters for the memory store
//!
//! Counters are bumped with relaxed atomics on the hot path and read back as
//! a plain `StatsSnapshot` after workers have joined.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live operation counters
#[derive(Debug, Default)]
pub struct StoreStats {
    reads: AtomicU64,
    writes: AtomicU64,
    atomic_increments: AtomicU64,
    lock_acquisitions: AtomicU64,
    commits: AtomicU64,
    rollbacks: AtomicU64,
    cas_successes: AtomicU64,
    cas_conflicts: AtomicU64,
}

/// Point-in-time copy of `StoreStats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Completed reads
    pub reads: u64,
    /// Completed unconditional writes
    pub writes: u64,
    /// Completed atomic increments
    pub atomic_increments: u64,
    /// Row locks granted
    pub lock_acquisitions: u64,
    /// Successful commits
    pub commits: u64,
    /// Rollbacks, including implicit ones on session drop
    pub rollbacks: u64,
    /// Compare-and-swap calls that wrote
    pub cas_successes: u64,
    /// Compare-and-swap calls rejected on version mismatch
    pub cas_conflicts: u64,
}

impl StatsSnapshot {
    /// Total compare-and-swap calls
    pub fn cas_attempts(&self) -> u64 {
        self.cas_successes + self.cas_conflicts
    }
}

impl StoreStats {
    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_atomic_increment(&self) {
        self.atomic_increments.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lock(&self) {
        self.lock_acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rollback(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cas(&self, swapped: bool) {
        if swapped {
            self.cas_successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cas_conflicts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            atomic_increments: self.atomic_increments.load(Ordering::Relaxed),
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            cas_successes: self.cas_successes.load(Ordering::Relaxed),
            cas_conflicts: self.cas_conflicts.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter
    pub fn reset(&self) {
        for counter in [
            &self.reads,
            &self.writes,
            &self.atomic_increments,
            &self.lock_acquisitions,
            &self.commits,
            &self.rollbacks,
            &self.cas_successes,
            &self.cas_conflicts,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
