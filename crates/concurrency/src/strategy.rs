//! Increment strategies
//!
//! Four ways to add one to a shared counter row, all written against the
//! `StoreSession` contract:
//!
//! | Strategy          | Steps                                         | Correct |
//! |-------------------|-----------------------------------------------|---------|
//! | `LostUpdate`      | read, write `value + 1`                       | no      |
//! | `InPlaceAtomic`   | store-side `value = value + 1`                | yes     |
//! | `PessimisticLock` | lock, read, write `value + 1`, commit         | yes     |
//! | `OptimisticCas`   | read, CAS on version, retry on mismatch       | yes     |
//!
//! ## Optimistic state machine
//!
//! ```text
//! READ -> COMPUTE -> ATTEMPT_WRITE --swapped--> DONE
//!   ^                      |
//!   +------ backoff -------+ version mismatch
//!                          |
//!                          +--attempts exhausted--> RetryExhausted
//! ```

use crate::retry::RetryPolicy;
use crate::stats::IncrementStats;
use counterbench_core::{CounterId, Error, Result, StoreSession};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag identifying a strategy without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Read, add one in the client, write back unconditionally
    LostUpdate,
    /// Single store-evaluated increment
    InPlaceAtomic,
    /// Exclusive row lock around read-modify-write
    PessimisticLock,
    /// Version-checked compare-and-swap with retry
    OptimisticCas,
}

impl StrategyKind {
    /// Every strategy, in presentation order
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::LostUpdate,
        StrategyKind::InPlaceAtomic,
        StrategyKind::PessimisticLock,
        StrategyKind::OptimisticCas,
    ];

    /// Stable machine-readable name
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::LostUpdate => "lost-update",
            StrategyKind::InPlaceAtomic => "in-place-atomic",
            StrategyKind::PessimisticLock => "pessimistic-lock",
            StrategyKind::OptimisticCas => "optimistic-cas",
        }
    }

    /// Human-readable title used in reports
    pub fn title(&self) -> &'static str {
        match self {
            StrategyKind::LostUpdate => "Lost update",
            StrategyKind::InPlaceAtomic => "In-place update",
            StrategyKind::PessimisticLock => "Row-level locking",
            StrategyKind::OptimisticCas => "Optimistic concurrency control",
        }
    }

    /// False only for the strategy that exists to lose updates
    pub fn guarantees_correctness(&self) -> bool {
        !matches!(self, StrategyKind::LostUpdate)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lost-update" => Ok(StrategyKind::LostUpdate),
            "in-place-atomic" | "in-place" => Ok(StrategyKind::InPlaceAtomic),
            "pessimistic-lock" | "row-lock" => Ok(StrategyKind::PessimisticLock),
            "optimistic-cas" | "optimistic" => Ok(StrategyKind::OptimisticCas),
            other => Err(Error::invalid_config(format!(
                "unknown strategy '{}', expected one of: lost-update, in-place, row-lock, optimistic",
                other
            ))),
        }
    }
}

/// An increment strategy, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Read, add one in the client, write back unconditionally
    LostUpdate,
    /// Single store-evaluated increment
    InPlaceAtomic,
    /// Exclusive row lock around read-modify-write
    PessimisticLock,
    /// Version-checked compare-and-swap with bounded retry
    OptimisticCas(RetryPolicy),
}

impl Strategy {
    /// Build the strategy for `kind`; `retry` only applies to `OptimisticCas`
    pub fn from_kind(kind: StrategyKind, retry: RetryPolicy) -> Self {
        match kind {
            StrategyKind::LostUpdate => Strategy::LostUpdate,
            StrategyKind::InPlaceAtomic => Strategy::InPlaceAtomic,
            StrategyKind::PessimisticLock => Strategy::PessimisticLock,
            StrategyKind::OptimisticCas => Strategy::OptimisticCas(retry),
        }
    }

    /// Tag of this strategy
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::LostUpdate => StrategyKind::LostUpdate,
            Strategy::InPlaceAtomic => StrategyKind::InPlaceAtomic,
            Strategy::PessimisticLock => StrategyKind::PessimisticLock,
            Strategy::OptimisticCas(_) => StrategyKind::OptimisticCas,
        }
    }

    /// Whether the final value is guaranteed to equal initial + N*M
    pub fn guarantees_correctness(&self) -> bool {
        self.kind().guarantees_correctness()
    }

    /// Perform one logical increment of `id`
    ///
    /// Returns the value this increment wrote. Conflicts of the optimistic
    /// strategy are retried here and only recorded in `stats`; every other
    /// failure is returned to the caller.
    pub fn increment<S: StoreSession + ?Sized>(
        &self,
        session: &mut S,
        id: CounterId,
        stats: &mut IncrementStats,
    ) -> Result<i64> {
        let written = match self {
            Strategy::LostUpdate => lost_update(session, id, stats)?,
            Strategy::InPlaceAtomic => in_place_atomic(session, id, stats)?,
            Strategy::PessimisticLock => pessimistic_lock(session, id, stats)?,
            Strategy::OptimisticCas(policy) => optimistic_cas(policy, session, id, stats)?,
        };
        stats.increments += 1;
        Ok(written)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

fn lost_update<S: StoreSession + ?Sized>(
    session: &mut S,
    id: CounterId,
    stats: &mut IncrementStats,
) -> Result<i64> {
    let current = session.read(id)?;
    // Another session may write between this read and the write below
    let next = current.value + 1;
    stats.attempts += 1;
    session.write(id, next)?;
    Ok(next)
}

fn in_place_atomic<S: StoreSession + ?Sized>(
    session: &mut S,
    id: CounterId,
    stats: &mut IncrementStats,
) -> Result<i64> {
    stats.attempts += 1;
    session.atomic_increment(id)
}

fn pessimistic_lock<S: StoreSession + ?Sized>(
    session: &mut S,
    id: CounterId,
    stats: &mut IncrementStats,
) -> Result<i64> {
    session.lock_exclusive(id)?;
    stats.attempts += 1;

    match locked_read_modify_write(session, id) {
        Ok(next) => {
            session.commit()?;
            Ok(next)
        }
        Err(e) => {
            if let Err(rollback_err) = session.rollback() {
                tracing::warn!(
                    session = %session.id(),
                    error = %rollback_err,
                    "rollback after failed critical section also failed"
                );
            }
            Err(e)
        }
    }
}

/// Critical section of the pessimistic strategy; the caller holds the lock
fn locked_read_modify_write<S: StoreSession + ?Sized>(session: &mut S, id: CounterId) -> Result<i64> {
    let current = session.read(id)?;
    let next = current.value + 1;
    session.write(id, next)?;
    Ok(next)
}

fn optimistic_cas<S: StoreSession + ?Sized>(
    policy: &RetryPolicy,
    session: &mut S,
    id: CounterId,
    stats: &mut IncrementStats,
) -> Result<i64> {
    let mut attempts: u32 = 0;
    loop {
        // READ
        let current = session.read(id)?;
        // COMPUTE
        let next = current.next();
        // ATTEMPT_WRITE
        attempts = attempts.saturating_add(1);
        stats.attempts += 1;
        if session.compare_and_swap(id, current.version, next.value, next.version)? {
            return Ok(next.value);
        }

        stats.conflicts += 1;
        tracing::trace!(
            session = %session.id(),
            attempt = attempts,
            expected_version = current.version,
            "version conflict, retrying"
        );
        if policy.is_exhausted(attempts) {
            tracing::warn!(session = %session.id(), attempts, "optimistic retries exhausted");
            return Err(Error::RetryExhausted { attempts });
        }
        policy.pause(attempts);
    }
}
