//! State records and the initial-state template.

use serde_json::{Map, Value};

use crate::error::StateStoreError;
use crate::Result;

/// Per-id mapping of field name to value.
///
/// Fields beyond those in the template are allowed; `set` may add any key.
pub type StateRecord = Map<String, Value>;

/// Default field set used to seed a record the first time an id is observed.
///
/// Immutable once built; every new id gets its own shallow copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialState {
    fields: StateRecord,
}

impl InitialState {
    /// Create an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Build a template from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(StateStoreError::InvalidTemplate(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// Parse a template from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value = serde_json::from_str(text)
            .map_err(|e| StateStoreError::InvalidTemplate(e.to_string()))?;
        Self::from_value(value)
    }

    /// Get the default fields.
    pub fn fields(&self) -> &StateRecord {
        &self.fields
    }

    /// Produce a fresh record for a newly observed id.
    pub fn instantiate(&self) -> StateRecord {
        self.fields.clone()
    }
}
