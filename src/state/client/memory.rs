//! In-memory key-value service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::KvClient;
use crate::error::StateStoreError;
use crate::Result;

#[derive(Default)]
struct Shared {
    values: RwLock<HashMap<String, String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    offline: AtomicBool,
}

/// A simulated shared key-value service.
///
/// Clones talk to the same map, so two stores built on clones of one
/// `MemoryKv` behave like two processes pointed at one server.
#[derive(Clone, Default)]
pub struct MemoryKv {
    shared: Arc<Shared>,
}

impl MemoryKv {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls served so far.
    pub fn reads(&self) -> usize {
        self.shared.reads.load(Ordering::SeqCst)
    }

    /// Number of `set` calls served so far.
    pub fn writes(&self) -> usize {
        self.shared.writes.load(Ordering::SeqCst)
    }

    /// Make every following call fail with a connection error, or recover.
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    /// Read a raw value without counting it as a service read.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.shared
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store a raw value without counting it as a service write.
    pub fn put_raw(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let mut values = self
            .shared
            .values
            .write()
            .map_err(|_| StateStoreError::LockPoisoned)?;
        values.insert(key.into(), value.into());
        Ok(())
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.shared
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    fn check_online(&self) -> Result<()> {
        if self.shared.offline.load(Ordering::SeqCst) {
            return Err(StateStoreError::Connection("service offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KvClient for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_online()?;
        self.shared.reads.fetch_add(1, Ordering::SeqCst);
        let values = self
            .shared
            .values
            .read()
            .map_err(|_| StateStoreError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_online()?;
        self.shared.writes.fetch_add(1, Ordering::SeqCst);
        let mut values = self
            .shared
            .values
            .write()
            .map_err(|_| StateStoreError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
