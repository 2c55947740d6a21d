//! Strategy Integration Tests
//!
//! Final-value guarantees of each strategy under real thread contention.

#[path = "../common/mod.rs"]
mod common;

mod correctness;
mod lost_update;
mod optimistic;
mod pessimistic;
