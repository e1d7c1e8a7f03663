//! Shared state store.
//!
//! This module provides the keyed state store, its record and key types,
//! the local and networked backends, and the clients and instrumentation
//! the networked backend is built from.

mod backend;
mod client;
mod instrument;
mod key;
mod record;
mod store;

pub use backend::{decode, encode, Backend, LocalBackend, NetworkedBackend};
pub use client::{validate_url, KvClient, MemoryKv, RedisClient};
pub use instrument::{
    perf_log_enabled, Measurement, NoopObserver, Operation, StoreObserver, TracingObserver,
};
pub use key::{Namespace, StoreKey};
pub use record::{InitialState, StateRecord};
pub use store::SharedStateStore;
