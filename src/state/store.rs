//! Id-level get/init/set on top of a backend.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{
    Backend, InitialState, KvClient, LocalBackend, Namespace, NetworkedBackend, RedisClient,
    StateRecord, StoreObserver, TracingObserver,
};
use crate::config::Config;
use crate::Result;

/// Keyed shared state for one namespace.
///
/// Each id gets a record seeded from the template the first time it is
/// seen. The backend is chosen at construction and never changes.
///
/// `set` is a plain read-modify-write: two concurrent `set` calls on the
/// same id may interleave and the later write wins for the whole record.
/// Callers needing more must serialize access per id themselves.
#[derive(Debug)]
pub struct SharedStateStore {
    namespace: Namespace,
    template: InitialState,
    backend: Backend,
}

impl SharedStateStore {
    /// Create a store backed by process-local memory.
    pub fn local(namespace: impl Into<Namespace>, template: InitialState) -> Self {
        Self {
            namespace: namespace.into(),
            template,
            backend: Backend::Local(LocalBackend::new()),
        }
    }

    /// Create a store backed by a shared key-value service.
    pub fn shared(
        namespace: impl Into<Namespace>,
        template: InitialState,
        client: Arc<dyn KvClient>,
    ) -> Self {
        let observer = Arc::new(TracingObserver::from_env());
        Self::shared_with_observer(namespace, template, client, observer)
    }

    /// Create a networked store that reports measurements to `observer`.
    pub fn shared_with_observer(
        namespace: impl Into<Namespace>,
        template: InitialState,
        client: Arc<dyn KvClient>,
        observer: Arc<dyn StoreObserver>,
    ) -> Self {
        let namespace = namespace.into();
        let backend = NetworkedBackend::new(namespace.clone(), client).with_observer(observer);
        Self {
            namespace,
            template,
            backend: Backend::Networked(backend),
        }
    }

    /// Create a store from configuration.
    ///
    /// A configured redis url selects the networked backend; otherwise the
    /// store is local.
    pub fn from_config(
        namespace: impl Into<Namespace>,
        config: &Config,
        template: InitialState,
    ) -> Result<Self> {
        let namespace = namespace.into();
        match config.backend.redis_url {
            Some(ref url) => {
                let client = RedisClient::from_url(url)?;
                debug!(
                    "Using redis ({}) for shared state store ({})",
                    client.address(),
                    namespace
                );
                let observer = TracingObserver::new(config.perf.enabled);
                Ok(Self::shared_with_observer(
                    namespace,
                    template,
                    Arc::new(client),
                    Arc::new(observer),
                ))
            }
            None => Ok(Self::local(namespace, template)),
        }
    }

    /// Whether state is shared with other processes.
    pub fn is_shared(&self) -> bool {
        self.backend.is_shared()
    }

    /// Get the namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Return the record for `id`, seeding it from the template if absent.
    ///
    /// An existing record is returned as stored, even if its fields no
    /// longer match the template.
    pub async fn init(&self, id: &str) -> Result<StateRecord> {
        if let Some(record) = self.backend.read(id).await? {
            return Ok(record);
        }

        let record = self.template.instantiate();
        self.backend.write(id, &record).await?;
        debug!("Seeded {} from initial state", self.namespace.key_for(id));
        Ok(record)
    }

    /// Return the current record for `id`, initializing it if never seen.
    pub async fn get(&self, id: &str) -> Result<StateRecord> {
        match self.backend.read(id).await? {
            Some(record) => Ok(record),
            None => self.init(id).await,
        }
    }

    /// Set one field of `id`'s record and persist the whole record.
    ///
    /// Returns the updated record.
    pub async fn set(
        &self,
        id: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<StateRecord> {
        let mut record = self.get(id).await?;
        record.insert(key.into(), value.into());
        self.backend.write(id, &record).await?;
        Ok(record)
    }
}
