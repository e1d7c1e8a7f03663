//! Networked backend adapter.
//!
//! Namespaces ids into service keys, serializes records to JSON text, and
//! measures every read and write.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug_span, warn, Instrument};

use crate::error::StateStoreError;
use crate::state::{
    KvClient, Measurement, Namespace, NoopObserver, Operation, StateRecord, StoreObserver,
};
use crate::Result;

/// Adapter between the store and a shared key-value service.
pub struct NetworkedBackend {
    namespace: Namespace,
    client: Arc<dyn KvClient>,
    observer: Arc<dyn StoreObserver>,
}

impl fmt::Debug for NetworkedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkedBackend")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl NetworkedBackend {
    /// Create an adapter with no instrumentation.
    pub fn new(namespace: Namespace, client: Arc<dyn KvClient>) -> Self {
        Self {
            namespace,
            client,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replace the observer that receives measurements.
    pub fn with_observer(mut self, observer: Arc<dyn StoreObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn measure(&self, op: Operation, id: &str, bytes: usize, started: Instant) {
        self.observer.observe(&Measurement {
            op,
            namespace: self.namespace.to_string(),
            id: id.to_string(),
            bytes,
            elapsed: started.elapsed(),
        });
    }

    /// Read and parse the record for `id`.
    ///
    /// `Ok(None)` means the key does not exist. A key holding an empty
    /// object is `Ok(Some(empty))`.
    pub async fn read(&self, id: &str) -> Result<Option<StateRecord>> {
        let span = debug_span!("state_read", namespace = %self.namespace, id);
        self.read_inner(id).instrument(span).await
    }

    async fn read_inner(&self, id: &str) -> Result<Option<StateRecord>> {
        let key = self.namespace.key_for(id).to_string();

        let started = Instant::now();
        let reply = self.client.get(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "shared state read failed");
            e
        })?;
        self.measure(Operation::Read, id, reply.as_ref().map_or(0, String::len), started);

        let Some(text) = reply else {
            return Ok(None);
        };

        let started = Instant::now();
        let record = decode(&key, &text)?;
        self.measure(Operation::Parse, id, text.len(), started);
        Ok(Some(record))
    }

    /// Serialize `record` and overwrite the value stored for `id`.
    pub async fn write(&self, id: &str, record: &StateRecord) -> Result<()> {
        let span = debug_span!("state_write", namespace = %self.namespace, id);
        self.write_inner(id, record).instrument(span).await
    }

    async fn write_inner(&self, id: &str, record: &StateRecord) -> Result<()> {
        let key = self.namespace.key_for(id).to_string();

        let started = Instant::now();
        let text = encode(record)?;
        self.client.set(&key, &text).await.map_err(|e| {
            warn!(key = %key, error = %e, "shared state write failed");
            e
        })?;
        self.measure(Operation::Write, id, text.len(), started);
        Ok(())
    }
}

/// Serialize a record to its wire text.
pub fn encode(record: &StateRecord) -> Result<String> {
    serde_json::to_string(record).map_err(StateStoreError::Serialize)
}

/// Parse wire text back into a record. Anything but a JSON object is an error.
pub fn decode(key: &str, text: &str) -> Result<StateRecord> {
    serde_json::from_str(text).map_err(|source| StateStoreError::Deserialize {
        key: key.to_string(),
        source,
    })
}
