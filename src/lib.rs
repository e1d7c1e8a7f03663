//! # shared-state-store
//!
//! Keyed shared state for cooperating server processes.
//!
//! A [`SharedStateStore`] holds one small record per caller-supplied id
//! (a channel id, a session id) under a namespace. Records live either in
//! process memory or in a Redis server shared by every process pointed at
//! it; callers use the same `init`/`get`/`set` calls either way.
//!
//! ## Features
//!
//! - **Lazy initialization**: an id is seeded from an initial-state template
//!   the first time it is seen
//! - **Two backends**: process-local map, or Redis with keys
//!   `<namespace>:<id>` and JSON values
//! - **Instrumentation**: read, parse and write timings and payload sizes
//!   reported through an injected [`StoreObserver`]
//!
//! `set` is a plain read-modify-write with last-writer-wins semantics; there
//! is no locking across writers to the same id.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shared_state_store::{InitialState, SharedStateStore};
//!
//! #[tokio::main]
//! async fn main() -> shared_state_store::Result<()> {
//!     shared_state_store::logging::try_init().ok();
//!
//!     let template = InitialState::new().with_field("current", 0);
//!     let store = SharedStateStore::local("chan", template);
//!
//!     let record = store.set("1", "current", 5).await?;
//!     println!("channel 1 is at {}", record["current"]);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;

// Re-export commonly used types
pub use error::{Result, StateStoreError};
pub use state::{
    InitialState, KvClient, MemoryKv, Namespace, RedisClient, SharedStateStore, StateRecord,
    StoreObserver,
};
