//! Orchestration Integration Tests
//!
//! Run lifecycle, failure isolation and reporting.

#[path = "../common/mod.rs"]
mod common;

mod failures;
mod lifecycle;
