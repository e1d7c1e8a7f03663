//! Error types for shared-state-store.

use thiserror::Error;

/// Main error type for state store operations.
#[derive(Error, Debug)]
pub enum StateStoreError {
    /// The networked backend could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend sent a reply this client does not understand.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The backend answered with an error reply.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored value could not be parsed back into a record.
    #[error("failed to deserialize record at {key}: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized for the wire.
    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The connection target could not be parsed.
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),

    /// The initial-state template is not a field mapping.
    #[error("invalid initial state: {0}")]
    InvalidTemplate(String),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl From<redis::RedisError> for StateStoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error()
            || e.is_connection_refusal()
            || e.is_connection_dropped()
            || e.is_timeout()
        {
            return Self::Connection(e.to_string());
        }
        match e.kind() {
            redis::ErrorKind::TypeError => Self::Protocol(e.to_string()),
            redis::ErrorKind::InvalidClientConfig => Self::InvalidUrl(e.to_string()),
            _ => Self::Backend(e.to_string()),
        }
    }
}

/// Convenience Result type for state store operations.
pub type Result<T> = std::result::Result<T, StateStoreError>;
