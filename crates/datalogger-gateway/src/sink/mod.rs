//! Time-series sink clients.
//!
//! Sink writes are best-effort: `BestEffortSink` queues them for a single
//! writer task and only logs failures, so a sink outage never changes an
//! ingest response.

mod best_effort;
mod graphite;

use std::collections::BTreeMap;

use async_trait::async_trait;

use datalogger_core::error::Result;

pub use best_effort::BestEffortSink;
pub use graphite::GraphiteClient;

/// Numeric time-series writer.
#[async_trait]
pub trait TimeSeriesSink: Send + Sync {
    /// Write `metrics` stamped at `timestamp_ms` (milliseconds since epoch).
    async fn write(&self, metrics: &BTreeMap<String, f64>, timestamp_ms: f64) -> Result<()>;
}
