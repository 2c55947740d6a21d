//! Counter row with session-scoped exclusive locking
//!
//! A row is a latch-protected `RowState` plus a condition variable signalled
//! whenever the row lock is released. The latch is held only for the few
//! instructions of a single operation; the row lock (`owner`) is the
//! long-lived, session-scoped claim that other writers wait on.

use counterbench_core::{CounterId, CounterState, Error, Result, SessionId};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Latch-protected contents of a row
#[derive(Debug)]
pub(crate) struct RowState {
    /// Last committed value and version
    pub(crate) committed: CounterState,
    /// Session holding the exclusive row lock, if any
    pub(crate) owner: Option<SessionId>,
}

impl RowState {
    /// True if a session other than `session` holds the lock
    fn locked_by_other(&self, session: SessionId) -> bool {
        matches!(self.owner, Some(owner) if owner != session)
    }
}

/// A single counter row
#[derive(Debug)]
pub(crate) struct Row {
    id: CounterId,
    state: Mutex<RowState>,
    released: Condvar,
}

impl Row {
    pub(crate) fn new(id: CounterId, initial: CounterState) -> Self {
        Self {
            id,
            state: Mutex::new(RowState {
                committed: initial,
                owner: None,
            }),
            released: Condvar::new(),
        }
    }

    /// Latch the row without regard to the row lock
    ///
    /// Used by plain reads, which never block on another session's lock.
    pub(crate) fn latch(&self) -> MutexGuard<'_, RowState> {
        self.state.lock()
    }

    /// Latch the row once no other session holds its lock
    ///
    /// Waits on the release signal while another session owns the row. With
    /// a `timeout`, gives up with `Error::LockTimeout` once it has elapsed.
    pub(crate) fn latch_unlocked(
        &self,
        session: SessionId,
        timeout: Option<Duration>,
    ) -> Result<MutexGuard<'_, RowState>> {
        let mut guard = self.state.lock();
        if !guard.locked_by_other(session) {
            return Ok(guard);
        }

        let started = Instant::now();
        tracing::trace!(counter = %self.id, %session, "waiting for row lock");
        while guard.locked_by_other(session) {
            match timeout {
                Some(limit) => {
                    let waited = started.elapsed();
                    if waited >= limit {
                        return Err(Error::LockTimeout {
                            counter: self.id,
                            waited,
                        });
                    }
                    self.released.wait_for(&mut guard, limit - waited);
                }
                None => self.released.wait(&mut guard),
            }
        }
        Ok(guard)
    }

    /// Release the row lock if `session` holds it
    ///
    /// When `publish` is given it becomes the committed state before the
    /// lock is dropped. Waiters are woken either way.
    pub(crate) fn release(&self, session: SessionId, publish: Option<CounterState>) {
        let mut guard = self.state.lock();
        if guard.owner != Some(session) {
            return;
        }
        if let Some(state) = publish {
            guard.committed = state;
        }
        guard.owner = None;
        drop(guard);
        self.released.notify_all();
    }
}
