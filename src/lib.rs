//! Keyval Cache - bounded in-memory and versioned persistent caches
//!
//! Provides a FIFO-bounded memory cache and a schema-versioned, TTL-aware
//! cache over an asynchronous key-value store, plus an HTTP surface for it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    BoundedMemoryCache, PersistentCacheOptions, SweepState, VersionedPersistentCache,
};
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use tasks::spawn_sweep_task;
