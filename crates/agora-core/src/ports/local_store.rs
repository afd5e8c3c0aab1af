use async_trait::async_trait;

/// Local store - small key/value storage for per-viewer flags.
///
/// Values are whole documents; callers read, change and write them back in
/// full.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Get the value stored under `key`.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> Result<(), LocalStoreError>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> bool;
}

/// Local store errors.
#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
