//! Metric ingestion (`POST /metrics`).
//!
//! `handler` maps HTTP to a batch run and a status code; `batch` does the
//! per-item fan-out to the document store and the time-series sink.

pub mod batch;
pub mod handler;

pub use batch::{run_batch, BatchReport};
pub use handler::post_metrics;
