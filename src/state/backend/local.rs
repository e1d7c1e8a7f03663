//! Process-local backend.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StateStoreError;
use crate::state::StateRecord;
use crate::Result;

/// In-process map from id to record, owned by one store.
#[derive(Debug, Default)]
pub struct LocalBackend {
    records: RwLock<HashMap<String, StateRecord>>,
}

impl LocalBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the record for `id`, or `None` if it was never written.
    pub fn read(&self, id: &str) -> Result<Option<StateRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| StateStoreError::LockPoisoned)?;
        Ok(records.get(id).cloned())
    }

    /// Replace the record for `id`.
    pub fn write(&self, id: &str, record: &StateRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StateStoreError::LockPoisoned)?;
        records.insert(id.to_string(), record.clone());
        Ok(())
    }
}
