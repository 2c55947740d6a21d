//! Core types for counterbench
//!
//! This module defines the foundational types:
//! - CounterId: Stable key of the counter row
//! - CounterState: Value and version as stored in the row
//! - SessionId: Identity of a store session
//! - RunId: Unique identifier for a benchmark run

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable key of a counter row
///
/// The key is fixed for the whole benchmark run. The default (`1`) matches the
/// single row every run contends on unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterId(u64);

impl CounterId {
    /// Create a counter id from its raw key
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw key
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for CounterId {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "counter:{}", self.0)
    }
}

/// Contents of a counter row as observed by a single read
///
/// `version` is only advanced by compare-and-swap writes; unconditional
/// writes and atomic increments leave it untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterState {
    /// The quantity under contention
    pub value: i64,
    /// Optimistic concurrency token
    pub version: u64,
}

impl CounterState {
    /// Create a state with the given value and version
    pub const fn new(value: i64, version: u64) -> Self {
        Self { value, version }
    }

    /// State after one successful optimistic increment
    ///
    /// Both value and version advance by exactly one.
    pub const fn next(&self) -> Self {
        Self {
            value: self.value + 1,
            version: self.version + 1,
        }
    }
}

/// Identity of one store session
///
/// Sessions are numbered in the order they are opened, starting at 0.
/// Row locks are owned by sessions, so two workers must never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a session id from its ordinal
    pub const fn new(ordinal: u64) -> Self {
        Self(ordinal)
    }

    /// Ordinal of the session in open order
    pub const fn ordinal(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Unique identifier for a benchmark run
///
/// A RunId is a wrapper around a UUID v4 so that results from repeated runs
/// can be told apart in logs and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
