//! File Store
//!
//! Durable [`KeyValueStore`] keeping one namespace as a JSON document on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::{KeyValueStore, Updater};

// == File Store ==
/// Namespace persisted at `<data_dir>/<namespace>.json`.
///
/// The document is loaded once on open. Every mutation rewrites it through a
/// temp file and a rename, so a crash mid-write leaves the previous document.
/// Memory only changes once the write has landed.
#[derive(Debug)]
pub struct FileStore {
    namespace: String,
    path: PathBuf,
    records: Mutex<BTreeMap<String, Value>>,
}

impl FileStore {
    // == Open ==
    /// Opens (or creates) the namespace document under `data_dir`.
    pub async fn open(data_dir: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).await?;

        let path = data_dir.join(format!("{}.json", namespace));
        let records: BTreeMap<String, Value> = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                CacheError::Store(format!("corrupt store file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(
            "Opened file store {} with {} records",
            path.display(),
            records.len()
        );

        Ok(Self {
            namespace,
            path,
            records: Mutex::new(records),
        })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Flush ==
    async fn flush(&self, records: &BTreeMap<String, Value>) -> Result<()> {
        let bytes = serde_json::to_vec(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Writes `next` to disk, then installs it in memory.
    ///
    /// A failed write leaves `records` untouched.
    async fn commit(
        &self,
        records: &mut BTreeMap<String, Value>,
        next: BTreeMap<String, Value>,
    ) -> Result<()> {
        self.flush(&next).await?;
        *records = next;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        next.insert(key.to_string(), value);
        self.commit(&mut records, next).await
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        next.extend(entries);
        self.commit(&mut records, next).await
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Value>>> {
        let records = self.records.lock().await;
        Ok(keys.iter().map(|key| records.get(key).cloned()).collect())
    }

    async fn update(&self, key: &str, updater: Updater) -> Result<()> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        let value = updater(next.get(key).cloned())?;
        next.insert(key.to_string(), value);
        self.commit(&mut records, next).await
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut records = self.records.lock().await;
        if !records.contains_key(key) {
            return Ok(());
        }
        let mut next = records.clone();
        next.remove(key);
        self.commit(&mut records, next).await
    }

    async fn del_many(&self, keys: &[String]) -> Result<()> {
        let mut records = self.records.lock().await;
        if !keys.iter().any(|key| records.contains_key(key)) {
            return Ok(());
        }
        let mut next = records.clone();
        for key in keys {
            next.remove(key);
        }
        self.commit(&mut records, next).await
    }

    async fn clear(&self) -> Result<()> {
        let mut records = self.records.lock().await;
        self.commit(&mut records, BTreeMap::new()).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.lock().await.keys().cloned().collect())
    }

    async fn values(&self) -> Result<Vec<Value>> {
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn entries(&self) -> Result<Vec<(String, Value)>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
