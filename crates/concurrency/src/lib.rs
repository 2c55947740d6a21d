//! Concurrency-control strategies for counterbench
//!
//! This crate implements the four ways of incrementing the shared counter:
//! - Strategy: closed set of variants (lost update, in-place atomic,
//!   pessimistic row lock, optimistic compare-and-swap)
//! - RetryPolicy: bounded, exponentially backed-off optimistic retries
//! - IncrementStats: attempts and conflicts recorded per worker
//!
//! Strategies never share state with each other or across workers; every
//! coordination point is a store operation on the worker's own session.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod retry;
pub mod stats;
pub mod strategy;

pub use retry::RetryPolicy;
pub use stats::IncrementStats;
pub use strategy::{Strategy, StrategyKind};
