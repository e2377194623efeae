//! `POST /metrics` handler.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use bytes::Bytes;

use datalogger_core::protocol::item::decode_batch;

use crate::app_state::AppState;
use crate::ingest::batch::run_batch;

/// `POST /metrics`: 200 when every item was stored, 500 on any invalid item
/// or store failure, 400 when the body is missing. Sink results never count.
pub async fn post_metrics(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let batch = match decode_batch(&body) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "missing required metric params");
            state.metrics().batches.inc(&[("outcome", "bad_request")]);
            return StatusCode::BAD_REQUEST;
        }
    };

    let started = Instant::now();
    let report = run_batch(&state, &batch.data).await;
    let outcome = if report.is_ok() { "ok" } else { "failed" };
    state.metrics().batches.inc(&[("outcome", outcome)]);
    state
        .metrics()
        .batch_duration
        .observe(&[("outcome", outcome)], started.elapsed());

    match report.first_error() {
        None => {
            tracing::debug!(count = report.dispatched, "logged new metric data okay");
            StatusCode::OK
        }
        Some(e) => {
            tracing::error!(
                error = %e,
                errors = report.errors.len(),
                dispatched = report.dispatched,
                skipped = report.skipped,
                "failed to log new metric data"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
