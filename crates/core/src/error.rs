//! Error types for counterbench
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! A compare-and-swap that loses a race is not an error: it is reported as
//! `Ok(false)` by the store and handled inside the optimistic strategy.

use crate::types::CounterId;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for counterbench operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for counterbench
#[derive(Debug, Error)]
pub enum Error {
    /// Store unreachable or session broken
    ///
    /// Fatal to the worker that observed it; siblings keep running.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The counter row does not exist
    #[error("Counter not found: {0}")]
    CounterNotFound(CounterId),

    /// A row lock could not be acquired within the configured bound
    #[error("Lock timeout on {counter} after {waited:?}")]
    LockTimeout {
        /// Row that was contended
        counter: CounterId,
        /// How long the session waited
        waited: Duration,
    },

    /// Optimistic retry loop gave up
    #[error("Retry exhausted after {attempts} attempts")]
    RetryExhausted {
        /// Number of compare-and-swap attempts made
        attempts: u32,
    },

    /// Invalid benchmark configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker panicked mid-run
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Error::Connection(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// True if this is a transport failure
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}
