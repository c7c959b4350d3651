use std::env;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use super::{KeyValueStore, StoreError};

const KEY_PREFIX: &str = "phillipian";

#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    pub async fn from_env() -> Result<Self, StoreError> {
        let url = env::var("REDIS_URL").map_err(|_| StoreError::MissingUrl)?;
        Self::new(&url).await
    }

    pub fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

fn namespaced(key: &str) -> String {
    format!("{KEY_PREFIX}:{key}")
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection();
        let value: Option<String> = conn.get(namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.connection();
        let _: () = conn.set(namespaced(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection();
        let _: () = conn.del(namespaced(key)).await?;
        Ok(())
    }
}
