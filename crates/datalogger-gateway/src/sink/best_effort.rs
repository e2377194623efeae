//! Lossy sink path: a bounded queue drained by one writer task.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::{self, error::TrySendError};

use datalogger_core::protocol::item::MetricValue;

use crate::obs::metrics::GatewayMetrics;

use super::TimeSeriesSink;

/// One queued data point.
#[derive(Debug)]
struct Point {
    metric: String,
    value: f64,
    timestamp_ms: f64,
}

/// Fire-and-forget front for a `TimeSeriesSink`.
///
/// `dispatch` never waits: points go into a bounded queue and are dropped
/// when it is full. A single task writes them in arrival order. Failures are
/// logged and counted, never returned.
#[derive(Clone)]
pub struct BestEffortSink {
    tx: mpsc::Sender<Point>,
    metrics: Arc<GatewayMetrics>,
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or_default()
}

impl BestEffortSink {
    /// Start the writer task. Must be called from inside a tokio runtime.
    /// `capacity` must be non-zero.
    pub fn spawn(inner: Arc<dyn TimeSeriesSink>, capacity: usize, metrics: Arc<GatewayMetrics>) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(run_writer(inner, rx, Arc::clone(&metrics)));
        Self { tx, metrics }
    }

    /// Queue a single-point write. Returns `false` when nothing was queued:
    /// the value cannot be graphed, or the queue is full.
    /// A missing timestamp means "now".
    pub fn dispatch(&self, metric: &str, value: &MetricValue, timestamp_ms: Option<f64>) -> bool {
        let Some(n) = value.as_f64() else {
            tracing::error!(metric = %metric, value = %value, "error writing to graphite: value is not numeric");
            self.metrics.sink_writes.inc(&[("result", "skipped")]);
            return false;
        };

        let point = Point {
            metric: metric.to_string(),
            value: n,
            timestamp_ms: timestamp_ms.unwrap_or_else(now_ms),
        };
        match self.tx.try_send(point) {
            Ok(()) => true,
            Err(TrySendError::Full(p)) => {
                tracing::warn!(metric = %p.metric, "graphite queue full, dropping point");
                self.metrics.sink_writes.inc(&[("result", "dropped")]);
                false
            }
            Err(TrySendError::Closed(p)) => {
                tracing::error!(metric = %p.metric, "graphite writer stopped, dropping point");
                self.metrics.sink_writes.inc(&[("result", "dropped")]);
                false
            }
        }
    }
}

async fn run_writer(
    sink: Arc<dyn TimeSeriesSink>,
    mut rx: mpsc::Receiver<Point>,
    metrics: Arc<GatewayMetrics>,
) {
    while let Some(p) = rx.recv().await {
        let points = BTreeMap::from([(p.metric, p.value)]);
        match sink.write(&points, p.timestamp_ms).await {
            Ok(()) => metrics.sink_writes.inc(&[("result", "ok")]),
            Err(e) => {
                tracing::error!(error = %e, "error writing to graphite");
                metrics.sink_writes.inc(&[("result", "failed")]);
            }
        }
    }
    tracing::debug!("graphite writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tokio::sync::{Notify, Semaphore};

    use datalogger_core::error::Result;

    /// Blocks inside the first write until released.
    struct Stalled {
        entered: Notify,
        release: Semaphore,
    }

    #[async_trait]
    impl TimeSeriesSink for Stalled {
        async fn write(&self, _metrics: &BTreeMap<String, f64>, _timestamp_ms: f64) -> Result<()> {
            self.entered.notify_one();
            let _permit = self.release.acquire().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn full_queue_drops_and_counts() {
        let stalled = Arc::new(Stalled { entered: Notify::new(), release: Semaphore::new(0) });
        let metrics = Arc::new(GatewayMetrics::default());
        let sink = BestEffortSink::spawn(stalled.clone(), 2, Arc::clone(&metrics));

        assert!(sink.dispatch("cpu.load", &MetricValue::Number(1.0), Some(1.0)));
        stalled.entered.notified().await;

        // writer is busy: two fit in the queue, the rest are dropped
        let queued = (0..5)
            .filter(|_| sink.dispatch("cpu.load", &MetricValue::Number(2.0), Some(1.0)))
            .count();
        assert_eq!(queued, 2);
        assert_eq!(metrics.sink_writes.get(&[("result", "dropped")]), 3);
    }

    #[tokio::test]
    async fn text_value_is_skipped() {
        let stalled = Arc::new(Stalled { entered: Notify::new(), release: Semaphore::new(0) });
        let metrics = Arc::new(GatewayMetrics::default());
        let sink = BestEffortSink::spawn(stalled, 4, Arc::clone(&metrics));

        assert!(!sink.dispatch("system.health.status", &"UNKNOWN".into(), None));
        assert_eq!(metrics.sink_writes.get(&[("result", "skipped")]), 1);
    }
}
