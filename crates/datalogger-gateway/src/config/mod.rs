//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use datalogger_core::error::{DataLoggerError, Result};

pub use schema::{
    GatewayConfig, GatewaySection, IngestSection, OnError, SinkSection, StoreBackend,
    StoreSection,
};

/// Default config file, read from the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "datalogger.yaml";

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "DATALOGGER_CONFIG";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| DataLoggerError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| DataLoggerError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config for the binary.
///
/// An explicit path must exist. The default file is optional; without it the
/// built-in defaults apply.
pub fn load(explicit: Option<&str>) -> Result<GatewayConfig> {
    match explicit {
        Some(path) => load_from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from_file(DEFAULT_CONFIG_PATH),
        None => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
            let cfg = GatewayConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
