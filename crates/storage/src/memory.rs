//! In-process transactional row store
//!
//! `MemoryStore` implements the backing store contract entirely in memory so
//! that the harness can be run and tested without an external database.
//!
//! # Design
//!
//! - DashMap of rows: lookups only touch one shard, and the row `Arc` is
//!   cloned out before any waiting so no shard lock is held while blocked
//! - Per-row latch + condvar: the latch covers a single operation, the row
//!   lock (`owner`) spans a session's lock scope
//! - Lock scopes buffer writes in the session and publish them at commit
//!   (read committed)
//!
//! # Simulated round trips
//!
//! `StoreConfig::op_latency` is slept before every session operation, outside
//! any latch. A networked store has the same gap between a client's read and
//! its following write, which is where lost updates come from.
//!
//! # Fault injection
//!
//! `disconnect` makes every operation fail with `Error::Connection` until
//! `reconnect`. `fail_session_after` breaks one session after a number of
//! successful operations; it must be armed before that session is opened.

use crate::row::Row;
use crate::stats::{StatsSnapshot, StoreStats};
use counterbench_core::{
    BackingStore, CounterId, CounterState, Error, Result, SessionId, StoreSession,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tunables for `MemoryStore`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Delay applied before every session operation
    pub op_latency: Duration,
    /// Upper bound on any wait for a row lock (None = wait forever)
    pub lock_timeout: Option<Duration>,
}

impl StoreConfig {
    /// Set the simulated round-trip latency
    pub fn with_op_latency(mut self, latency: Duration) -> Self {
        self.op_latency = latency;
        self
    }

    /// Set the lock wait bound
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }
}

#[derive(Debug)]
struct StoreInner {
    rows: DashMap<CounterId, Arc<Row>>,
    config: StoreConfig,
    connected: AtomicBool,
    next_session: AtomicU64,
    /// Session ordinal -> operations allowed before the session breaks
    faults: Mutex<HashMap<u64, u64>>,
    stats: StoreStats,
}

impl StoreInner {
    fn check_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::connection("store is unreachable"))
        }
    }

    fn row(&self, id: CounterId) -> Result<Arc<Row>> {
        self.rows
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(Error::CounterNotFound(id))
    }
}

/// In-memory implementation of `BackingStore`
///
/// Cloning is cheap and yields a handle to the same store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with default configuration
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                rows: DashMap::new(),
                config,
                connected: AtomicBool::new(true),
                next_session: AtomicU64::new(0),
                faults: Mutex::new(HashMap::new()),
                stats: StoreStats::default(),
            }),
        }
    }

    /// Configuration this store was created with
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Make every subsequent operation fail with `Error::Connection`
    pub fn disconnect(&self) {
        tracing::warn!("memory store disconnected");
        self.inner.connected.store(false, Ordering::Release);
    }

    /// Undo `disconnect`
    pub fn reconnect(&self) {
        self.inner.connected.store(true, Ordering::Release);
    }

    /// Break the session with the given open-order ordinal after `ops`
    /// successful operations
    pub fn fail_session_after(&self, ordinal: u64, ops: u64) {
        self.inner.faults.lock().insert(ordinal, ops);
    }

    /// Operation counters since creation or the last `reset_stats`
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Zero the operation counters
    pub fn reset_stats(&self) {
        self.inner.stats.reset();
    }

    /// Committed contents of a row, bypassing sessions and faults
    pub fn committed(&self, id: CounterId) -> Option<CounterState> {
        self.inner.row(id).ok().map(|row| row.latch().committed)
    }
}

impl BackingStore for MemoryStore {
    type Session = MemorySession;

    fn open_session(&self) -> Result<MemorySession> {
        self.inner.check_connected()?;
        let ordinal = self.inner.next_session.fetch_add(1, Ordering::SeqCst);
        let fail_after = self.inner.faults.lock().remove(&ordinal);
        tracing::debug!(session = ordinal, ?fail_after, "session opened");
        Ok(MemorySession {
            id: SessionId::new(ordinal),
            inner: Arc::clone(&self.inner),
            held: Vec::new(),
            pending: HashMap::new(),
            ops: 0,
            fail_after,
            broken: false,
        })
    }

    fn ping(&self) -> Result<()> {
        self.inner.check_connected()
    }

    fn reset_counter(&self, id: CounterId, initial: i64) -> Result<()> {
        self.inner.check_connected()?;
        let state = CounterState::new(initial, 0);
        let row = Arc::clone(
            self.inner
                .rows
                .entry(id)
                .or_insert_with(|| Arc::new(Row::new(id, state)))
                .value(),
        );
        row.latch().committed = state;
        tracing::debug!(counter = %id, initial, "counter reset");
        Ok(())
    }
}

/// A session against a `MemoryStore`
///
/// Holds the row locks it acquired and the writes it buffered inside its
/// lock scope. Dropping the session rolls both back.
#[derive(Debug)]
pub struct MemorySession {
    id: SessionId,
    inner: Arc<StoreInner>,
    held: Vec<CounterId>,
    pending: HashMap<CounterId, CounterState>,
    ops: u64,
    fail_after: Option<u64>,
    broken: bool,
}

impl MemorySession {
    /// Simulated round trip plus fault checks, run before every operation
    fn begin_op(&mut self) -> Result<()> {
        let latency = self.inner.config.op_latency;
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        self.inner.check_connected()?;
        if self.broken {
            return Err(Error::connection(format!("{} is broken", self.id)));
        }
        if let Some(limit) = self.fail_after {
            if self.ops >= limit {
                self.broken = true;
                tracing::warn!(session = %self.id, ops = self.ops, "injected session failure");
                return Err(Error::connection(format!("{} connection reset", self.id)));
            }
        }
        self.ops += 1;
        Ok(())
    }

    fn holds(&self, id: CounterId) -> bool {
        self.held.contains(&id)
    }

    /// Release every held lock, publishing pending writes if `publish`
    fn release_all(&mut self, publish: bool) {
        let pending = std::mem::take(&mut self.pending);
        for id in self.held.drain(..) {
            if let Ok(row) = self.inner.row(id) {
                let state = if publish {
                    pending.get(&id).copied()
                } else {
                    None
                };
                row.release(self.id, state);
            }
        }
    }

    /// Current state as seen by this session: its own pending write first
    fn visible(&self, id: CounterId, committed: CounterState) -> CounterState {
        self.pending.get(&id).copied().unwrap_or(committed)
    }
}

impl StoreSession for MemorySession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn read(&mut self, id: CounterId) -> Result<CounterState> {
        self.begin_op()?;
        let row = self.inner.row(id)?;
        let committed = row.latch().committed;
        self.inner.stats.record_read();
        Ok(self.visible(id, committed))
    }

    fn write(&mut self, id: CounterId, value: i64) -> Result<()> {
        self.begin_op()?;
        let row = self.inner.row(id)?;
        if self.holds(id) {
            let current = self.visible(id, row.latch().committed);
            self.pending.insert(id, CounterState::new(value, current.version));
        } else {
            let mut guard = row.latch_unlocked(self.id, self.inner.config.lock_timeout)?;
            guard.committed.value = value;
        }
        self.inner.stats.record_write();
        Ok(())
    }

    fn atomic_increment(&mut self, id: CounterId) -> Result<i64> {
        self.begin_op()?;
        let row = self.inner.row(id)?;
        let value = if self.holds(id) {
            let mut current = self.visible(id, row.latch().committed);
            current.value += 1;
            self.pending.insert(id, current);
            current.value
        } else {
            let mut guard = row.latch_unlocked(self.id, self.inner.config.lock_timeout)?;
            guard.committed.value += 1;
            guard.committed.value
        };
        self.inner.stats.record_atomic_increment();
        Ok(value)
    }

    fn lock_exclusive(&mut self, id: CounterId) -> Result<()> {
        self.begin_op()?;
        if self.holds(id) {
            return Ok(());
        }
        let row = self.inner.row(id)?;
        let mut guard = row.latch_unlocked(self.id, self.inner.config.lock_timeout)?;
        guard.owner = Some(self.id);
        drop(guard);
        self.held.push(id);
        self.inner.stats.record_lock();
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if let Err(e) = self.begin_op() {
            self.release_all(false);
            self.inner.stats.record_rollback();
            return Err(e);
        }
        self.release_all(true);
        self.inner.stats.record_commit();
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        let result = self.begin_op();
        self.release_all(false);
        self.inner.stats.record_rollback();
        result
    }

    fn compare_and_swap(
        &mut self,
        id: CounterId,
        expected_version: u64,
        new_value: i64,
        new_version: u64,
    ) -> Result<bool> {
        self.begin_op()?;
        let row = self.inner.row(id)?;
        let swapped = if self.holds(id) {
            let current = self.visible(id, row.latch().committed);
            let matches = current.version == expected_version;
            if matches {
                self.pending
                    .insert(id, CounterState::new(new_value, new_version));
            }
            matches
        } else {
            let mut guard = row.latch_unlocked(self.id, self.inner.config.lock_timeout)?;
            let matches = guard.committed.version == expected_version;
            if matches {
                guard.committed = CounterState::new(new_value, new_version);
            }
            matches
        };
        self.inner.stats.record_cas(swapped);
        Ok(swapped)
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if !self.held.is_empty() {
            tracing::debug!(session = %self.id, locks = self.held.len(), "releasing locks on drop");
            self.release_all(false);
            self.inner.stats.record_rollback();
        }
    }
}
