use serde_json::Value;

/// Errors a cache store can report. The cache layer never lets these reach
/// its callers.
#[derive(Debug, thiserror::Error)]
pub enum CacheStoreError {
    /// Failed to create the storage directory.
    #[error("Failed to create cache directory: {0}")]
    CreateDir(std::io::Error),

    /// Failed to read from storage.
    #[error("Failed to read from cache: {0}")]
    Read(std::io::Error),

    /// Failed to write to storage.
    #[error("Failed to write to cache: {0}")]
    Write(std::io::Error),

    /// Failed to parse stored data.
    #[error("Failed to parse cached data: {0}")]
    Parse(serde_json::Error),

    /// Failed to serialize data.
    #[error("Failed to serialize cache data: {0}")]
    Serialize(serde_json::Error),

    /// Could not determine the user cache directory.
    #[error("Could not determine XDG cache directory")]
    NoCacheDir,

    /// The backing service could not be reached.
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

/// A key-value store holding JSON documents.
///
/// Stores are eventually consistent and offer no transactions. Expiry is
/// advisory at this level; the cache layer checks each entry's own
/// `expiresAt`.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// # Errors
    ///
    /// * If the store cannot be read
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheStoreError>;

    /// # Errors
    ///
    /// * If the store cannot be written
    async fn put(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), CacheStoreError>;

    /// Remove every key starting with `prefix`, returning how many went.
    ///
    /// # Errors
    ///
    /// * If the store cannot be scanned or written
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, CacheStoreError>;
}
