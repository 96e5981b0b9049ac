//! In-memory store for tests and ephemeral runs.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{Result, store::ConnectionStore, types::ConnectionRecord};

/// In-memory store backed by `HashMap`. Nothing survives the process.
pub struct InMemoryStore {
    records: Mutex<HashMap<String, ConnectionRecord>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionStore for InMemoryStore {
    async fn load_all(&self) -> Result<Vec<ConnectionRecord>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.values().cloned().collect())
    }

    async fn save(&self, record: &ConnectionRecord) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(record.platform_id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, platform_id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.remove(platform_id);
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {secrecy::Secret, serde_json::json};

    use super::*;

    fn record(platform_id: &str) -> ConnectionRecord {
        ConnectionRecord {
            platform_id: platform_id.into(),
            access_token: Secret::new("tok".into()),
            refresh_token: None,
            expires_at_ms: None,
            user_info: json!({}),
            connected_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn save_load_roundtrip() {
        let store = InMemoryStore::new();
        store.save(&record("twitter")).await.unwrap();
        store.save(&record("linkedin")).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn save_replaces_existing() {
        let store = InMemoryStore::new();
        store.save(&record("twitter")).await.unwrap();
        let mut updated = record("twitter");
        updated.connected_at_ms = 42;
        store.save(&updated).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].connected_at_ms, 42);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryStore::new();
        store.save(&record("twitter")).await.unwrap();
        store.delete("twitter").await.unwrap();
        store.delete("twitter").await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }
}
