//! Storage layer for counterbench
//!
//! This crate implements the in-process backing store:
//! - MemoryStore: DashMap of latch-protected rows implementing `BackingStore`
//! - MemorySession: per-worker session with row locks and buffered writes
//! - StoreConfig: simulated round-trip latency and lock wait bound
//! - StoreStats: operation counters (reads, writes, CAS outcomes, ...)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
mod row;
pub mod stats;

pub use memory::{MemorySession, MemoryStore, StoreConfig};
pub use stats::{StatsSnapshot, StoreStats};
