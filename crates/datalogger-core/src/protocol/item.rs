//! Ingest batch body (JSON).
//!
//! The batch keeps each item as a `serde_json::Value` so the full payload can
//! be stored unchanged; `MetricItem` is a borrowed, validated view over it.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DataLoggerError, Result};

/// Store key prefix for metric documents.
pub const METRIC_KEY_PREFIX: &str = "metric:";

/// Ingest request body.
#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    /// Ordered metric items (raw JSON objects). Absent or `null` is an empty
    /// batch.
    #[serde(default, deserialize_with = "nullable_items")]
    pub data: Vec<Value>,
}

fn nullable_items<'de, D>(de: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(de)?.unwrap_or_default())
}

/// Decode a request body into a batch.
///
/// An empty (or whitespace-only) body is reported separately from malformed
/// JSON so callers can log the two cases differently; both are `BadRequest`.
/// A JSON object without `data` decodes to an empty batch; a `data` that is
/// not an array is rejected.
pub fn decode_batch(body: &[u8]) -> Result<BatchRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DataLoggerError::BadRequest("missing request body".into()));
    }
    serde_json::from_slice(body)
        .map_err(|e| DataLoggerError::BadRequest(format!("invalid batch body: {e}")))
}

/// Reading value as sent by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    /// `null` or missing.
    Absent,
}

impl MetricValue {
    pub fn from_json(v: Option<&Value>) -> Self {
        match v {
            None | Some(Value::Null) => MetricValue::Absent,
            Some(Value::Number(n)) => n
                .as_f64()
                .map(MetricValue::Number)
                .unwrap_or_else(|| MetricValue::Text(n.to_string())),
            Some(Value::String(s)) => MetricValue::Text(s.clone()),
            Some(other) => MetricValue::Text(other.to_string()),
        }
    }

    /// Numeric form for the time-series sink. Numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(s) => s.trim().parse::<f64>().ok(),
            MetricValue::Absent => None,
        }
        .filter(|n| n.is_finite())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Absent => f.write_str("null"),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

/// Validated view over one batch item.
#[derive(Debug, Clone)]
pub struct MetricItem<'a> {
    pub metric: &'a str,
    pub value: MetricValue,
    /// Milliseconds since the Unix epoch, if supplied.
    pub timestamp: Option<f64>,
    /// The item exactly as received.
    pub payload: &'a Value,
}

impl<'a> MetricItem<'a> {
    /// Validate the item at `index`. The metric name must be a non-empty string.
    pub fn parse(index: usize, raw: &'a Value) -> Result<Self> {
        let obj = raw.as_object().ok_or(DataLoggerError::InvalidItem {
            index,
            reason: "item is not an object",
        })?;

        let metric = match obj.get("metric") {
            Some(Value::String(s)) if !s.is_empty() => s.as_str(),
            Some(Value::String(_)) => {
                return Err(DataLoggerError::InvalidItem { index, reason: "metric is empty" })
            }
            None | Some(Value::Null) => {
                return Err(DataLoggerError::InvalidItem { index, reason: "metric is missing" })
            }
            Some(_) => {
                return Err(DataLoggerError::InvalidItem { index, reason: "metric is not a string" })
            }
        };

        let timestamp = match obj.get("timestamp") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|t| t.is_finite());

        Ok(Self {
            metric,
            value: MetricValue::from_json(obj.get("value")),
            timestamp,
            payload: raw,
        })
    }

    /// Document store key for this item.
    pub fn store_key(&self) -> String {
        format!("{METRIC_KEY_PREFIX}{}", self.metric)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn whitespace_body_is_missing() {
        let err = decode_batch(b"  \n").unwrap_err();
        assert!(err.to_string().contains("missing request body"));
    }

    #[test]
    fn absent_or_null_data_is_an_empty_batch() {
        let bodies: [&[u8]; 3] = [b"{}", br#"{"data": null}"#, br#"{"items": [1]}"#];
        for body in bodies {
            assert!(decode_batch(body).unwrap().data.is_empty());
        }
    }

    #[test]
    fn non_array_data_is_bad_request() {
        let bodies: [&[u8]; 3] = [br#"{"data": {"metric": "a"}}"#, br#"{"data": "x"}"#, b"[1, 2]"];
        for body in bodies {
            let err = decode_batch(body).unwrap_err();
            assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
        }
    }

    #[test]
    fn parses_item_and_keeps_payload() {
        let raw = json!({"metric": "cpu.load", "value": "5", "timestamp": 1454321000123u64, "source": "x"});
        let item = MetricItem::parse(0, &raw).unwrap();
        assert_eq!(item.metric, "cpu.load");
        assert_eq!(item.value, MetricValue::Text("5".into()));
        assert_eq!(item.timestamp, Some(1454321000123.0));
        assert_eq!(item.store_key(), "metric:cpu.load");
        assert_eq!(item.payload["source"], "x");
    }

    #[test]
    fn rejects_empty_null_and_missing_metric() {
        for raw in [json!({"metric": ""}), json!({"metric": null}), json!({"value": 1})] {
            let err = MetricItem::parse(3, &raw).unwrap_err();
            assert_eq!(err.client_code().as_str(), "INVALID_ITEM");
        }
    }

    #[test]
    fn numeric_strings_convert_for_sink() {
        assert_eq!(MetricValue::from("5").as_f64(), Some(5.0));
        assert_eq!(MetricValue::from("OK").as_f64(), None);
        assert_eq!(MetricValue::Absent.as_f64(), None);
    }
}
