//! Enum table: categorical metric values -> numeric codes.
//!
//! Graphite only stores numbers, so readings such as `OK`/`WARN`/`ERROR` are
//! translated before they reach the sink. The document store always receives
//! the value as received.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{DataLoggerError, Result};
use crate::protocol::item::MetricValue;

/// One table entry: metrics whose name contains `pattern` use `values`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnumRule {
    pub pattern: String,
    pub values: BTreeMap<String, i64>,
}

/// Ordered enum table. Rules are checked in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumTable {
    rules: Vec<EnumRule>,
}

impl Default for EnumTable {
    /// `health`: OK=0, WARN=1, ERROR=2.
    fn default() -> Self {
        Self { rules: default_rules() }
    }
}

pub fn default_rules() -> Vec<EnumRule> {
    vec![EnumRule {
        pattern: "health".into(),
        values: BTreeMap::from([
            ("OK".to_string(), 0),
            ("WARN".to_string(), 1),
            ("ERROR".to_string(), 2),
        ]),
    }]
}

impl EnumTable {
    /// Build a table, rejecting empty patterns (they would match every metric).
    pub fn new(rules: Vec<EnumRule>) -> Result<Self> {
        if let Some(r) = rules.iter().find(|r| r.pattern.is_empty()) {
            return Err(DataLoggerError::Config(format!(
                "enum rule with empty pattern ({} values)",
                r.values.len()
            )));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[EnumRule] {
        &self.rules
    }

    /// Translate `value` for `metric`.
    ///
    /// The first rule whose pattern is a (case-sensitive) substring of the
    /// metric name and that defines the value wins. Everything else is
    /// returned unchanged.
    pub fn convert(&self, metric: &str, value: &MetricValue) -> MetricValue {
        let MetricValue::Text(text) = value else {
            return value.clone();
        };
        self.rules
            .iter()
            .filter(|r| metric.contains(r.pattern.as_str()))
            .find_map(|r| r.values.get(text))
            .map(|code| MetricValue::Number(*code as f64))
            .unwrap_or_else(|| value.clone())
    }
}

/// Free-function form of [`EnumTable::convert`].
pub fn convert_enum_to_number(table: &EnumTable, metric: &str, value: &MetricValue) -> MetricValue {
    table.convert(metric, value)
}
