//! Batch fan-out.
//!
//! Items are visited in order. Each valid item starts one store `create`
//! (collected in a `FuturesUnordered`, so all of them run concurrently) and one
//! best-effort sink write. The batch settles when every started store write
//! has finished.

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use serde_json::Value;

use datalogger_core::error::DataLoggerError;
use datalogger_core::protocol::item::MetricItem;

use crate::app_state::AppState;
use crate::config::OnError;

/// Result of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Items whose side effects were started.
    pub dispatched: usize,
    /// Items that failed validation.
    pub rejected: usize,
    /// Items never visited because an earlier item halted the batch.
    pub skipped: usize,
    /// Validation and store errors, in the order they were observed.
    pub errors: Vec<DataLoggerError>,
}

impl BatchReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn first_error(&self) -> Option<&DataLoggerError> {
        self.errors.first()
    }
}

pub async fn run_batch(state: &AppState, items: &[Value]) -> BatchReport {
    let store = state.store();
    let topic = state.cfg().ingest.topic.as_str();
    let on_error = state.cfg().ingest.on_error;

    let mut report = BatchReport::default();
    let mut writes = FuturesUnordered::new();

    for (index, raw) in items.iter().enumerate() {
        let item = match MetricItem::parse(index, raw) {
            Ok(item) => item,
            Err(e) => {
                tracing::error!(index, error = %e, "missing required data in metric body");
                report.rejected += 1;
                report.errors.push(e);
                if on_error == OnError::Halt {
                    report.skipped = items.len() - index - 1;
                    break;
                }
                continue;
            }
        };

        let key = item.store_key();
        let payload = item.payload;
        writes.push(async move {
            let res = store.create(&key, payload, topic).await;
            (key, res)
        });

        let value = state.enums().convert(item.metric, &item.value);
        state.sink().dispatch(item.metric, &value, item.timestamp);
        report.dispatched += 1;
    }

    while let Some((key, res)) = writes.next().await {
        if let Err(e) = res {
            tracing::error!(key = %key, backend = store.backend(), error = %e, "store create failed");
            state.metrics().store_errors.inc(&[("backend", store.backend())]);
            report.errors.push(e);
        }
    }

    state.metrics().items.add(&[("result", "dispatched")], report.dispatched as u64);
    state.metrics().items.add(&[("result", "rejected")], report.rejected as u64);
    report
}
