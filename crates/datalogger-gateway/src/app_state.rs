//! Shared application state for the datalogger gateway.
//!
//! Built once at startup from an immutable `GatewayConfig`: the enum table,
//! origin whitelist and both downstream clients are compiled here and shared
//! by every request.

use std::sync::Arc;

use tokio::time::Duration;

use datalogger_core::enums::EnumTable;
use datalogger_core::error::Result;

use crate::config::{GatewayConfig, StoreBackend};
use crate::obs::metrics::GatewayMetrics;
use crate::policy::OriginPolicy;
use crate::sink::{BestEffortSink, GraphiteClient, TimeSeriesSink};
use crate::store::{DocumentStore, MemoryStore, RedisStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    enums: EnumTable,
    origins: OriginPolicy,
    store: Arc<dyn DocumentStore>,
    sink: BestEffortSink,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Build application state with the backends named in `cfg`.
    /// The whitelist hostname falls back to the `HOSTNAME` env var.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match cfg.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Redis => Arc::new(RedisStore::open(&cfg.store.url)?),
        };
        let sink = Arc::new(GraphiteClient::from_url(
            &cfg.sink.url,
            Duration::from_millis(cfg.sink.connect_timeout_ms),
            Duration::from_millis(cfg.sink.write_timeout_ms),
            Duration::from_millis(cfg.sink.reconnect_backoff_ms),
        )?);
        let hostname = OriginPolicy::resolve_hostname(cfg.gateway.hostname.as_deref());

        tracing::info!(
            store = store.backend(),
            sink = %sink.addr(),
            hostname = %hostname,
            "backends configured"
        );
        Self::with_backends(cfg, &hostname, store, sink)
    }

    /// Build application state around explicit collaborators.
    /// Starts the sink writer task, so it must run inside a tokio runtime.
    pub fn with_backends(
        cfg: GatewayConfig,
        hostname: &str,
        store: Arc<dyn DocumentStore>,
        sink: Arc<dyn TimeSeriesSink>,
    ) -> Result<Self> {
        let enums = EnumTable::new(cfg.ingest.enums.clone())?;
        let origins = OriginPolicy::new(hostname, &cfg.gateway.extra_origins)?;
        let metrics = Arc::new(GatewayMetrics::default());
        let sink = BestEffortSink::spawn(sink, cfg.sink.queue_capacity, Arc::clone(&metrics));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                enums,
                origins,
                store,
                sink,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn enums(&self) -> &EnumTable {
        &self.inner.enums
    }

    pub fn origins(&self) -> &OriginPolicy {
        &self.inner.origins
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    pub fn sink(&self) -> &BestEffortSink {
        &self.inner.sink
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }
}
