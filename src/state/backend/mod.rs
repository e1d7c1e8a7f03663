//! Storage backends.
//!
//! A store uses exactly one backend for its whole lifetime.

mod local;
mod networked;

pub use local::LocalBackend;
pub use networked::{decode, encode, NetworkedBackend};

use crate::state::StateRecord;
use crate::Result;

/// The backend a store was built with.
#[derive(Debug)]
pub enum Backend {
    /// In-process map, private to one store.
    Local(LocalBackend),
    /// External key-value service, shared by every store on the same
    /// service and namespace.
    Networked(NetworkedBackend),
}

impl Backend {
    /// Whether records are shared with other processes.
    pub fn is_shared(&self) -> bool {
        matches!(self, Backend::Networked(_))
    }

    /// Read the record for `id`; `None` if it has never been written.
    pub async fn read(&self, id: &str) -> Result<Option<StateRecord>> {
        match self {
            Backend::Local(local) => local.read(id),
            Backend::Networked(net) => net.read(id).await,
        }
    }

    /// Overwrite the whole record for `id`.
    pub async fn write(&self, id: &str, record: &StateRecord) -> Result<()> {
        match self {
            Backend::Local(local) => local.write(id, record),
            Backend::Networked(net) => net.write(id, record).await,
        }
    }
}
