//! Redis-backed document store.
//!
//! `create` runs `SET key <json>` and `PUBLISH topic {"key","data"}` in one
//! atomic pipeline. The connection is opened on first use and then managed
//! (reconnects) by `ConnectionManager`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use datalogger_core::error::{DataLoggerError, Result};

use super::DocumentStore;

pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
}

impl RedisStore {
    /// Parse `url`; no connection is made until the first write.
    pub fn open(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| DataLoggerError::Config(format!("invalid redis url: {e}")))?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        self.conn
            .get_or_try_init(|| async {
                ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| DataLoggerError::Store(format!("redis connect failed: {e}")))
            })
            .await
            .cloned()
    }
}

/// Message published on the topic for each created document.
fn notification(key: &str, payload: &Value) -> String {
    json!({ "key": key, "data": payload }).to_string()
}

#[async_trait]
impl DocumentStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn create(&self, key: &str, payload: &Value, topic: &str) -> Result<()> {
        let doc = payload.to_string();
        let note = notification(key, payload);
        let mut conn = self.connection().await?;

        redis::pipe()
            .atomic()
            .set(key, doc)
            .ignore()
            .publish(topic, note)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DataLoggerError::Store(format!("redis create {key} failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_redis_url() {
        assert!(RedisStore::open("http://localhost:6379").is_err());
    }

    #[test]
    fn notification_wraps_payload() {
        let n = notification("metric:cpu", &json!({"metric": "cpu", "value": 1}));
        let v: Value = serde_json::from_str(&n).unwrap();
        assert_eq!(v["key"], "metric:cpu");
        assert_eq!(v["data"]["value"], 1);
    }
}
