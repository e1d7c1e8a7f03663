//! Redis client on top of the `redis` crate.
//!
//! One multiplexed connection is opened on first use and shared by every
//! call. Replies are matched to requests by the connection driver, so a
//! call dropped mid-flight (e.g. by `tokio::time::timeout`) never hands its
//! reply to the next caller.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, IntoConnectionInfo, RedisResult};
use tokio::sync::Mutex;
use tracing::debug;

use super::KvClient;
use crate::error::StateStoreError;
use crate::Result;

/// Check a `redis://[[user]:password@]host[:port][/db]` URL without connecting.
pub fn validate_url(url: &str) -> Result<()> {
    url.into_connection_info()
        .map(|_| ())
        .map_err(|e| StateStoreError::InvalidUrl(format!("{url}: {e}")))
}

/// [`KvClient`] backed by a Redis server.
pub struct RedisClient {
    client: redis::Client,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Create a client from a `redis://` URL. No connection is made yet.
    pub fn from_url(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StateStoreError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self {
            client,
            conn: Mutex::new(None),
        })
    }

    /// `host:port` of the server, without credentials.
    pub fn address(&self) -> String {
        self.client.get_connection_info().addr.to_string()
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut guard = self.conn.lock().await;
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        debug!("Connected to redis at {}", self.address());
        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Forget a connection that has failed; the next call reconnects.
    async fn finish<T>(&self, reply: RedisResult<T>) -> Result<T> {
        match reply {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_io_error() || e.is_connection_dropped() {
                    *self.conn.lock().await = None;
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl KvClient for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let reply: RedisResult<Option<String>> = conn.get(key).await;
        self.finish(reply).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let reply: RedisResult<()> = conn.set(key, value).await;
        self.finish(reply).await
    }
}
