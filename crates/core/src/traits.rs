//! Core traits for the backing store abstraction
//!
//! This module defines the BackingStore and StoreSession traits. Strategies
//! and workers are written against these traits only, so the in-process
//! store used by the harness can be swapped for any row store offering the
//! same primitives.
//!
//! # Transactions
//!
//! Every session operation is its own transaction (autocommit), except inside
//! a lock scope: after `lock_exclusive` and until `commit`/`rollback`, writes
//! by the lock holder are buffered and become visible to other sessions only
//! at commit.

use crate::error::Result;
use crate::types::{CounterId, CounterState, SessionId};

/// Row store holding the contended counter
///
/// Thread safety: the store itself is shared by reference between the
/// orchestrator and all workers, so it must be Send + Sync. Sessions are
/// handed out one per worker and are never shared.
pub trait BackingStore: Send + Sync {
    /// Session type produced by this store
    type Session: StoreSession;

    /// Open a new dedicated session
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the store cannot be reached.
    fn open_session(&self) -> Result<Self::Session>;

    /// Check that the store is reachable
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the store cannot be reached.
    fn ping(&self) -> Result<()>;

    /// Create the counter row, or reset it if it already exists
    ///
    /// After this call the row holds `value = initial` and `version = 0`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the store cannot be reached.
    fn reset_counter(&self, id: CounterId, initial: i64) -> Result<()>;
}

/// A single client session against a BackingStore
///
/// Row locks are scoped to the session that acquired them. Dropping a session
/// releases its locks and discards any uncommitted writes.
pub trait StoreSession: Send {
    /// Identity of this session
    fn id(&self) -> SessionId;

    /// Read the committed row (or this session's pending write)
    ///
    /// Never blocks on another session's row lock.
    ///
    /// # Errors
    ///
    /// `Error::Connection` on transport failure, `Error::CounterNotFound` if
    /// the row does not exist.
    fn read(&mut self, id: CounterId) -> Result<CounterState>;

    /// Unconditionally overwrite the value
    ///
    /// Blocks while another session holds the row lock.
    ///
    /// # Errors
    ///
    /// `Error::Connection`, `Error::CounterNotFound` or `Error::LockTimeout`.
    fn write(&mut self, id: CounterId, value: i64) -> Result<()>;

    /// Increment the value by one in a single store-evaluated step
    ///
    /// Returns the new value. The store serializes this against every other
    /// writer of the row; the caller never reads the prior value.
    ///
    /// # Errors
    ///
    /// `Error::Connection`, `Error::CounterNotFound` or `Error::LockTimeout`.
    fn atomic_increment(&mut self, id: CounterId) -> Result<i64>;

    /// Block until this session holds an exclusive lock on the row
    ///
    /// Must be paired with `commit` or `rollback` on the same session.
    /// Locking a row the session already holds is a no-op.
    ///
    /// # Errors
    ///
    /// `Error::Connection`, `Error::CounterNotFound` or `Error::LockTimeout`.
    fn lock_exclusive(&mut self, id: CounterId) -> Result<()>;

    /// Publish pending writes and release every lock held by the session
    ///
    /// # Errors
    ///
    /// `Error::Connection` on transport failure. Locks are released even
    /// when the commit fails.
    fn commit(&mut self) -> Result<()>;

    /// Discard pending writes and release every lock held by the session
    ///
    /// # Errors
    ///
    /// `Error::Connection` on transport failure. Locks are released even
    /// when the rollback fails.
    fn rollback(&mut self) -> Result<()>;

    /// Write `new_value`/`new_version` only if the stored version equals
    /// `expected_version`
    ///
    /// Returns `Ok(false)` with no mutation when the version does not match;
    /// that is a conflict, not an error.
    ///
    /// # Errors
    ///
    /// `Error::Connection`, `Error::CounterNotFound` or `Error::LockTimeout`.
    fn compare_and_swap(
        &mut self,
        id: CounterId,
        expected_version: u64,
        new_value: i64,
        new_version: u64,
    ) -> Result<bool>;
}
