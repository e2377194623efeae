//! In-process document store, the default backend.

use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use datalogger_core::error::Result;

use super::DocumentStore;

/// Notifications kept per topic; older ones are discarded.
pub const NOTIFY_LOG_CAP: usize = 1024;

/// In-process store: key -> latest document, topic -> most recently
/// notified keys (at most `NOTIFY_LOG_CAP`).
#[derive(Default)]
pub struct MemoryStore {
    docs: DashMap<String, Value>,
    topics: DashMap<String, VecDeque<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            topics: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.docs.get(key).map(|d| d.value().clone())
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Recent keys notified on `topic`, oldest first.
    pub fn notifications(&self, topic: &str) -> Vec<String> {
        self.topics
            .get(topic)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, key: &str, payload: &Value, topic: &str) -> Result<()> {
        self.docs.insert(key.to_string(), payload.clone());
        let mut log = self.topics.entry(topic.to_string()).or_default();
        if log.len() == NOTIFY_LOG_CAP {
            log.pop_front();
        }
        log.push_back(key.to_string());
        Ok(())
    }
}
