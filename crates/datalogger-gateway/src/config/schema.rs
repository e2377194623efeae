//! Config schema: sections, defaults and range checks.

use serde::Deserialize;

use datalogger_core::enums::{default_rules, EnumRule};
use datalogger_core::error::{DataLoggerError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub ingest: IngestSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub sink: SinkSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            ingest: IngestSection::default(),
            store: StoreSection::default(),
            sink: SinkSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(DataLoggerError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.ingest.validate()?;
        self.store.validate()?;
        self.sink.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Overrides the `HOSTNAME` environment variable for the origin whitelist.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Additional exact origins granted CORS access.
    #[serde(default)]
    pub extra_origins: Vec<String>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            hostname: None,
            extra_origins: Vec::new(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(DataLoggerError::Config(format!(
                "gateway.listen must be a socket address, got {:?}",
                self.listen
            )));
        }
        if matches!(self.hostname.as_deref(), Some("")) {
            return Err(DataLoggerError::Config("gateway.hostname must not be empty".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3001".into()
}

/// What a batch does after the first invalid item.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Stop starting further items; in-flight store writes still settle.
    #[default]
    Halt,
    /// Attempt every valid item and collect errors.
    Continue,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestSection {
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default)]
    pub on_error: OnError,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Ordered enum table (first matching pattern wins).
    #[serde(default = "default_rules")]
    pub enums: Vec<EnumRule>,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            on_error: OnError::default(),
            max_body_bytes: default_max_body_bytes(),
            enums: default_rules(),
        }
    }
}

impl IngestSection {
    pub fn validate(&self) -> Result<()> {
        if self.topic.is_empty() {
            return Err(DataLoggerError::Config("ingest.topic must not be empty".into()));
        }
        if !(1024..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(DataLoggerError::Config(
                "ingest.max_body_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }
}

fn default_topic() -> String {
    "platform-console-backend-metric-update".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_store_url")]
    pub url: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_store_url(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Redis && !self.url.starts_with("redis://") {
            return Err(DataLoggerError::Config(
                "store.url must be a redis:// url for the redis backend".into(),
            ));
        }
        Ok(())
    }
}

fn default_store_url() -> String {
    "redis://127.0.0.1:6379/".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkSection {
    #[serde(default = "default_sink_url")]
    pub url: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Delay before reconnecting after a failed connect.
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,

    /// Points waiting for the writer; further points are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for SinkSection {
    fn default() -> Self {
        Self {
            url: default_sink_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SinkSection {
    pub fn validate(&self) -> Result<()> {
        if !self.url.starts_with("plaintext://") {
            return Err(DataLoggerError::Config(
                "sink.url must use the plaintext:// scheme".into(),
            ));
        }
        if !(100..=60000).contains(&self.connect_timeout_ms) {
            return Err(DataLoggerError::Config(
                "sink.connect_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if !(100..=60000).contains(&self.write_timeout_ms) {
            return Err(DataLoggerError::Config(
                "sink.write_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if !(100..=600_000).contains(&self.reconnect_backoff_ms) {
            return Err(DataLoggerError::Config(
                "sink.reconnect_backoff_ms must be between 100 and 600000".into(),
            ));
        }
        if !(1..=1_000_000).contains(&self.queue_capacity) {
            return Err(DataLoggerError::Config(
                "sink.queue_capacity must be between 1 and 1000000".into(),
            ));
        }
        Ok(())
    }
}

fn default_sink_url() -> String {
    "plaintext://localhost:2003/".into()
}
fn default_connect_timeout_ms() -> u64 {
    2000
}
fn default_write_timeout_ms() -> u64 {
    2000
}
fn default_reconnect_backoff_ms() -> u64 {
    5000
}
fn default_queue_capacity() -> usize {
    1024
}
