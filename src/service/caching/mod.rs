use async_trait::async_trait;
use thiserror::Error;

pub mod collections;
pub mod file;
pub mod memory;
pub mod redis;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis url not set (REDIS_URL)")]
    MissingUrl,
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Device-local string storage, shaped like a browser's local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
