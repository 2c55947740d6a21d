//! Core types and traits for counterbench
//!
//! This crate defines the foundational pieces shared by every layer:
//! - CounterId / CounterState: the single contended row and its contents
//! - SessionId: identity of one store session (one per worker)
//! - RunId: unique identifier for one benchmark run
//! - Error: error taxonomy (connection, lock timeout, retry exhaustion, ...)
//! - Traits: the backing store contract (BackingStore, StoreSession)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{BackingStore, StoreSession};
pub use types::{CounterId, CounterState, RunId, SessionId};
