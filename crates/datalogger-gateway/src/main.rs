//! datalogger gateway
//!
//! - Ingest endpoint: POST /metrics (document store + Graphite sink)
//! - Probes: /healthz, /readyz, /stats
//! - Graceful drain on ctrl-c / SIGTERM

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use datalogger_core::error::{DataLoggerError, Result};
use datalogger_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "datalogger-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let explicit = std::env::var(config::CONFIG_PATH_ENV).ok();
    let cfg = config::load(explicit.as_deref())?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| DataLoggerError::Config(format!("gateway.listen: {e}")))?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(
        %listen,
        origins = ?state.origins().origins().collect::<Vec<_>>(),
        "datalogger-gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| DataLoggerError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| DataLoggerError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: app_state::AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.set_draining();
    tracing::info!("shutdown signal received, draining");
}
