//! Metrics module
//!
//! Request accounting for the pagination engine.
//!
//! # Overview
//!
//! The metrics module provides:
//! - `MetricsCollector` - Thread-safe recorder updated on every request
//! - `PaginationMetrics` - Point-in-time snapshot of the counters
//!
//! Metrics are advisory. Recording never fails and never blocks a request on
//! anything but a short mutex.

mod collector;

pub use collector::{MetricsCollector, PaginationMetrics};
