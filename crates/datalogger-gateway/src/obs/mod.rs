//! Lightweight in-process metrics.
//!
//! Counters and histograms are stored as atomics and rendered in Prometheus
//! text format by the `/stats` handler.

pub mod metrics;
