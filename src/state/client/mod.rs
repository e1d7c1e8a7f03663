//! Key-value service clients used by the networked backend.
//!
//! The store treats the service as an opaque get/set-by-key blob store.

mod memory;
mod redis_client;

use async_trait::async_trait;

use crate::Result;

pub use memory::MemoryKv;
pub use redis_client::{validate_url, RedisClient};

/// An external key-value service shared by every process pointed at it.
#[async_trait]
pub trait KvClient: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist. An existing key holding
    /// an empty string is `Ok(Some(""))`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
