//! Axum router wiring.
//!
//! The ingest endpoint answers at `/metrics` and `/metrics/` and carries the
//! CORS whitelist; operational probes live at the root.

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{app_state::AppState, ingest, ops};

pub fn build_router(state: AppState) -> Router {
    let ingest = Router::new()
        .route("/metrics", post(ingest::post_metrics))
        .route("/metrics/", post(ingest::post_metrics))
        .layer(state.origins().cors_layer())
        .layer(DefaultBodyLimit::max(state.cfg().ingest.max_body_bytes));

    Router::new()
        .merge(ingest)
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/stats", get(ops::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
