//! datalogger gateway library entry.
//!
//! This crate wires the ingest endpoint, origin policy, document store and
//! time-series sink clients into one HTTP service. It is consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod ingest;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod sink;
pub mod store;
