//! JSON test vector loader shared by batch tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TestVector {
    pub description: String,
    /// Raw request body, sent as-is.
    pub body: String,
    #[serde(default)]
    pub expect: Option<Vec<ExpectItem>>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectItem {
    /// Expected store key, or null when the item must fail validation.
    pub key: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    /// Expected sink value after enum translation (null: not graphable).
    #[serde(default)]
    pub sink_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
}

pub fn load(name: &str) -> TestVector {
    let s = std::fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}
