//! datalogger core: metric item model, enum normalization, and the Graphite
//! plaintext encoding shared by the gateway and its tests.
//!
//! This crate carries no transport or runtime dependencies. It only knows how
//! to read a batch body, translate categorical values into numbers, and render
//! sink lines.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed request
//! bodies surface as `DataLoggerError` values instead of crashing the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod enums;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{DataLoggerError, Result};
