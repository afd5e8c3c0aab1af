//! In-memory local store - per-process stand-in for browser-style storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use agora_core::ports::{LocalStore, LocalStoreError};

/// In-memory local store using a simple HashMap with async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryLocalStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryLocalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        tracing::trace!(key = %key, bytes = value.len(), "Local entry written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), LocalStoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}
