//! Graphite plaintext (carbon) line encoding.
//!
//! One line per metric: `<path> <value> <unix seconds>\n`. Timestamps arrive
//! in milliseconds and are floored to whole seconds.

use std::collections::BTreeMap;
use std::fmt::Write;

use bytes::Bytes;

use crate::error::{DataLoggerError, Result};

/// Convert a millisecond timestamp to carbon seconds.
pub fn carbon_seconds(timestamp_ms: f64) -> i64 {
    (timestamp_ms / 1000.0).floor() as i64
}

fn check_path(path: &str) -> Result<()> {
    if path.is_empty() || path.chars().any(char::is_whitespace) {
        return Err(DataLoggerError::Sink(format!("invalid metric path: {path:?}")));
    }
    Ok(())
}

/// Encode `metrics` stamped with `timestamp_ms` into a carbon payload.
pub fn encode_lines(metrics: &BTreeMap<String, f64>, timestamp_ms: f64) -> Result<Bytes> {
    let secs = carbon_seconds(timestamp_ms);
    let mut out = String::with_capacity(metrics.len() * 48);
    for (path, value) in metrics {
        check_path(path)?;
        if !value.is_finite() {
            return Err(DataLoggerError::Sink(format!("non-finite value for {path}")));
        }
        let _ = writeln!(out, "{path} {value} {secs}");
    }
    Ok(Bytes::from(out))
}
