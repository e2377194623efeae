//! Shared error type across datalogger crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Missing or malformed request body.
    BadRequest,
    /// A metric item failed validation.
    InvalidItem,
    /// The document store rejected or failed a write.
    StoreFailed,
    /// The time-series sink failed a write.
    SinkFailed,
    /// Configuration could not be loaded or validated.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidItem => "INVALID_ITEM",
            ClientCode::StoreFailed => "STORE_FAILED",
            ClientCode::SinkFailed => "SINK_FAILED",
            ClientCode::BadConfig => "BAD_CONFIG",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, DataLoggerError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum DataLoggerError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid metric item at index {index}: {reason}")]
    InvalidItem { index: usize, reason: &'static str },
    #[error("store: {0}")]
    Store(String),
    #[error("sink: {0}")]
    Sink(String),
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl DataLoggerError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            DataLoggerError::BadRequest(_) => ClientCode::BadRequest,
            DataLoggerError::InvalidItem { .. } => ClientCode::InvalidItem,
            DataLoggerError::Store(_) => ClientCode::StoreFailed,
            DataLoggerError::Sink(_) => ClientCode::SinkFailed,
            DataLoggerError::Config(_) => ClientCode::BadConfig,
            DataLoggerError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            DataLoggerError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Errors that fail a batch as a whole (answered with a server error).
    pub fn is_batch_failure(&self) -> bool {
        matches!(
            self,
            DataLoggerError::InvalidItem { .. } | DataLoggerError::Store(_)
        )
    }
}
