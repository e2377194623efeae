//! Document store clients.
//!
//! Every accepted metric item is recorded with `create(key, payload, topic)`.
//! This is the must-succeed side effect of ingestion: its error fails the batch.

mod memory;
mod redis;

use async_trait::async_trait;
use serde_json::Value;

use datalogger_core::error::Result;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Durable document store keyed by string, with a change-notification topic.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name used in logs and metric labels.
    fn backend(&self) -> &'static str;

    /// Store `payload` under `key` and notify subscribers of `topic`.
    async fn create(&self, key: &str, payload: &Value, topic: &str) -> Result<()>;
}
