//! In-Memory Store
//!
//! Process-local [`KeyValueStore`] used by tests and ephemeral deployments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{KeyValueStore, Updater};

// == Memory Store ==
/// Ordered in-memory namespace. Listings come back in key order.
#[derive(Debug)]
pub struct MemoryStore {
    namespace: String,
    records: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty store for `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates a store pre-populated with raw records.
    pub fn with_records(
        namespace: impl Into<String>,
        records: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    /// Returns the number of raw records held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.records.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        self.records.write().await.extend(entries);
        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Value>>> {
        let records = self.records.read().await;
        Ok(keys.iter().map(|key| records.get(key).cloned()).collect())
    }

    async fn update(&self, key: &str, updater: Updater) -> Result<()> {
        let mut records = self.records.write().await;
        let next = updater(records.get(key).cloned())?;
        records.insert(key.to_string(), next);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn del_many(&self, keys: &[String]) -> Result<()> {
        let mut records = self.records.write().await;
        for key in keys {
            records.remove(key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    async fn values(&self) -> Result<Vec<Value>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn entries(&self) -> Result<Vec<(String, Value)>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
