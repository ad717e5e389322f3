//! Store Module
//!
//! The asynchronous key-value capability the persistent cache is layered over,
//! plus an in-process backend and a JSON-file backend.

mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Read-modify-write function handed to [`KeyValueStore::update`].
///
/// Receives whatever the store currently holds for the key and returns the
/// record to write back. An error aborts the update and leaves the key untouched.
pub type Updater = Box<dyn FnOnce(Option<Value>) -> Result<Value> + Send>;

// == Key Value Store ==
/// Asynchronous key-value store over a single logical namespace.
///
/// Keys are plain strings and values are opaque JSON blobs. Implementations
/// serialize conflicting writes to the same key themselves. Batch operations
/// are a single call but need not be atomic across keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Name of the namespace this store serves.
    fn namespace(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value) -> Result<()>;

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()>;

    /// Fetches every key in one call; the result is aligned with `keys`.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Value>>>;

    async fn update(&self, key: &str, updater: Updater) -> Result<()>;

    async fn del(&self, key: &str) -> Result<()>;

    async fn del_many(&self, keys: &[String]) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    async fn keys(&self) -> Result<Vec<String>>;

    async fn values(&self) -> Result<Vec<Value>>;

    async fn entries(&self) -> Result<Vec<(String, Value)>>;
}
