//! Async key-value storage behind the version and profile stores.
//!
//! The stores only ever see `KeyValueStorage`; which backend answers is
//! decided once at startup from `STORAGE_BACKEND`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, StorageBackend};

pub mod memory;
pub mod postgres;
pub mod redis_store;
pub mod s3;

pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal string key-value interface. Writes are last-write-wins per key.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Reads and decodes a JSON value. Missing keys and corrupt payloads both
/// yield `T::default()`; corruption is logged, never raised.
pub async fn load_json<T>(storage: &dyn KeyValueStorage, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = storage.get_item(key).await? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Discarding corrupt payload under '{key}': {e}");
            Ok(T::default())
        }
    }
}

pub async fn store_json<T: Serialize + ?Sized>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, raw).await
}

/// Builds the backend selected in the configuration.
pub async fn build_storage(config: &Config) -> Result<Arc<dyn KeyValueStorage>> {
    let storage: Arc<dyn KeyValueStorage> = match config.storage_backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL is required for the redis storage backend")?;
            Arc::new(redis_store::RedisStorage::connect(url).await?)
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres storage backend")?;
            Arc::new(postgres::PgStorage::connect(url).await?)
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .context("S3_BUCKET and S3_ENDPOINT are required for the s3 storage backend")?;
            let client = s3::build_s3_client(s3).await;
            Arc::new(s3::S3Storage::new(client, s3.bucket.clone()))
        }
    };
    info!("Storage backend initialized: {:?}", config.storage_backend);
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_load_missing_key_is_default() {
        let storage = MemoryStorage::new();
        let value: BTreeMap<String, u32> = load_json(&storage, "missing").await.unwrap();
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_payload_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage
            .set_item("versions:x", "{not json".to_string())
            .await
            .unwrap();
        let value: Vec<u32> = load_json(&storage, "versions:x").await.unwrap();
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let storage = MemoryStorage::new();
        store_json(&storage, "nums", &vec![1u32, 2, 3]).await.unwrap();
        let value: Vec<u32> = load_json(&storage, "nums").await.unwrap();
        assert_eq!(value, vec![1, 2, 3]);
    }
}
