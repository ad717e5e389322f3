//! Versioned Persistent Cache Module
//!
//! Schema-versioned, TTL-aware cache layered over a [`KeyValueStore`].
//!
//! Construction spawns a one-time sweep that deletes every stale record in the
//! namespace. Every public operation first waits for that sweep to resolve, so
//! no caller ever observes the pre-sweep store.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::envelope::current_timestamp_ms;
use crate::cache::{CacheStats, EnvelopePolicy, SharedStats};
use crate::error::{CacheError, Result};
use crate::store::{FileStore, KeyValueStore, MemoryStore};

// == Options ==
/// Configuration fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentCacheOptions {
    /// Namespace of the backing store
    pub namespace: String,
    /// Current schema version, must be positive
    pub version: u32,
    /// Optional time-to-live in seconds
    pub ttl: Option<u64>,
}

impl PersistentCacheOptions {
    pub fn new(namespace: impl Into<String>, version: u32) -> Self {
        Self {
            namespace: namespace.into(),
            version,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl = Some(ttl_seconds);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CacheError::InvalidConfig(
                "namespace cannot be empty".to_string(),
            ));
        }
        if self.version == 0 {
            return Err(CacheError::InvalidConfig(
                "schema version must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// == Sweep State ==
/// Lifecycle of the startup sweep gating every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepState {
    Initializing,
    Ready,
    /// The sweep failed; the cache instance stays unusable
    Failed(String),
}

// == Versioned Persistent Cache ==
/// Persistent cache storing values of type `T` inside versioned envelopes.
///
/// Clones share the store, the readiness gate and the statistics.
pub struct VersionedPersistentCache<T> {
    store: Arc<dyn KeyValueStore>,
    policy: EnvelopePolicy,
    ready: watch::Receiver<SweepState>,
    stats: Arc<SharedStats>,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for VersionedPersistentCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
            ready: self.ready.clone(),
            stats: Arc::clone(&self.stats),
            _value: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for VersionedPersistentCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedPersistentCache")
            .field("namespace", &self.store.namespace())
            .field("policy", &self.policy)
            .field("state", &*self.ready.borrow())
            .finish()
    }
}

impl<T> VersionedPersistentCache<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    // == Constructors ==
    /// Wraps `store` and spawns the startup sweep.
    ///
    /// Must be called within a tokio runtime; otherwise returns
    /// [`CacheError::InvalidConfig`].
    pub fn new(options: PersistentCacheOptions, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        options.validate()?;
        if store.namespace() != options.namespace {
            return Err(CacheError::InvalidConfig(format!(
                "store serves namespace '{}' but cache expects '{}'",
                store.namespace(),
                options.namespace
            )));
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            CacheError::InvalidConfig("cache must be created inside a tokio runtime".to_string())
        })?;

        let policy = EnvelopePolicy::new(options.version, options.ttl);
        let stats = Arc::new(SharedStats::default());
        let (tx, rx) = watch::channel(SweepState::Initializing);

        let sweep_store = Arc::clone(&store);
        let sweep_stats = Arc::clone(&stats);
        runtime.spawn(async move {
            let state = match purge(sweep_store.as_ref(), &policy).await {
                Ok(removed) => {
                    sweep_stats.record_evictions(removed);
                    info!(
                        "Startup sweep of '{}' removed {} stale records",
                        sweep_store.namespace(),
                        removed
                    );
                    SweepState::Ready
                }
                Err(e) => {
                    warn!(
                        "Startup sweep of '{}' failed: {}",
                        sweep_store.namespace(),
                        e
                    );
                    SweepState::Failed(e.to_string())
                }
            };
            // All receivers gone means the cache was dropped; nothing to notify.
            let _ = tx.send(state);
        });

        Ok(Self {
            store,
            policy,
            ready: rx,
            stats,
            _value: PhantomData,
        })
    }

    /// Builds a cache over a fresh in-memory store.
    pub fn in_memory(options: PersistentCacheOptions) -> Result<Self> {
        let store = Arc::new(MemoryStore::new(options.namespace.clone()));
        Self::new(options, store)
    }

    /// Builds a cache over the namespace document in `data_dir`.
    pub async fn open(options: PersistentCacheOptions, data_dir: impl AsRef<Path>) -> Result<Self> {
        options.validate()?;
        let store = FileStore::open(data_dir, options.namespace.clone()).await?;
        Self::new(options, Arc::new(store))
    }

    // == Readiness ==
    /// Current state of the startup sweep.
    pub fn state(&self) -> SweepState {
        self.ready.borrow().clone()
    }

    /// Waits until the startup sweep has resolved.
    ///
    /// Every caller observes the same outcome; the sweep never re-runs.
    pub async fn ready(&self) -> Result<()> {
        let mut rx = self.ready.clone();
        let state = rx
            .wait_for(|state| *state != SweepState::Initializing)
            .await
            .map(|state| state.clone())
            .map_err(|_| {
                CacheError::SweepFailed("sweep task ended without reporting".to_string())
            })?;

        match state {
            SweepState::Failed(msg) => Err(CacheError::SweepFailed(msg)),
            _ => Ok(()),
        }
    }

    pub fn namespace(&self) -> &str {
        self.store.namespace()
    }

    pub fn version(&self) -> u32 {
        self.policy.version()
    }

    pub fn ttl(&self) -> Option<u64> {
        self.policy.ttl()
    }

    // == Get ==
    /// Returns the value under `key`, or None when absent or stale.
    ///
    /// A stale record is deleted before returning.
    pub async fn get(&self, key: &str) -> Result<Option<T>> {
        self.ready().await?;

        let Some(raw) = self.store.get(key).await? else {
            self.stats.record_miss();
            return Ok(None);
        };

        match self.policy.open(raw) {
            Some(value) => {
                self.stats.record_hit();
                Ok(Some(value))
            }
            None => {
                debug!("Evicting stale record '{}'", key);
                self.store.del(key).await?;
                self.stats.record_miss();
                self.stats.record_evictions(1);
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Writes `value` under `key` in a fresh envelope, replacing any prior record.
    pub async fn set(&self, key: &str, value: &T) -> Result<()> {
        self.ready().await?;
        let raw = self.policy.seal(value)?;
        self.store.set(key, raw).await
    }

    /// Writes every entry in one store call.
    pub async fn set_many(&self, entries: Vec<(String, T)>) -> Result<()> {
        self.ready().await?;
        let sealed = entries
            .into_iter()
            .map(|(key, value)| Ok((key, self.policy.seal(&value)?)))
            .collect::<Result<Vec<_>>>()?;
        self.store.set_many(sealed).await
    }

    // == Get Many ==
    /// Fetches `keys` in one call and returns only the valid values.
    ///
    /// Absent and stale keys are dropped rather than marked, so the result can
    /// be shorter than `keys` and positions need not line up with the input.
    /// Use [`Self::get_many_aligned`] to keep positions.
    pub async fn get_many(&self, keys: &[String]) -> Result<Vec<T>> {
        Ok(self
            .get_many_aligned(keys)
            .await?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Fetches `keys` in one call, returning one slot per input key.
    ///
    /// Stale records found in the batch are deleted in one call before returning.
    pub async fn get_many_aligned(&self, keys: &[String]) -> Result<Vec<Option<T>>> {
        self.ready().await?;

        let mut raws = self.store.get_many(keys).await?.into_iter();
        let now = current_timestamp_ms();
        let mut stale = Vec::new();
        let mut values = Vec::with_capacity(keys.len());

        for key in keys {
            match raws.next().flatten() {
                Some(raw) => match self.policy.open_at(raw, now) {
                    Some(value) => {
                        self.stats.record_hit();
                        values.push(Some(value));
                    }
                    None => {
                        self.stats.record_miss();
                        stale.push(key.clone());
                        values.push(None);
                    }
                },
                None => {
                    self.stats.record_miss();
                    values.push(None);
                }
            }
        }

        if !stale.is_empty() {
            debug!("Evicting {} stale records from batch read", stale.len());
            self.store.del_many(&stale).await?;
            self.stats.record_evictions(stale.len());
        }

        Ok(values)
    }

    // == Update ==
    /// Read-modify-write of `key` through the store's atomic update.
    ///
    /// The updater sees the unwrapped current value (None when absent or
    /// stale) and its result is stored in a fresh envelope.
    pub async fn update<F>(&self, key: &str, updater: F) -> Result<()>
    where
        F: FnOnce(Option<T>) -> T + Send + 'static,
    {
        self.ready().await?;
        let policy = self.policy;
        self.store
            .update(
                key,
                Box::new(move |current: Option<Value>| {
                    let current = current.and_then(|raw| policy.open::<T>(raw));
                    policy.seal(&updater(current))
                }),
            )
            .await
    }

    // == Delete ==
    pub async fn del(&self, key: &str) -> Result<()> {
        self.ready().await?;
        self.store.del(key).await
    }

    pub async fn del_many(&self, keys: &[String]) -> Result<()> {
        self.ready().await?;
        self.store.del_many(keys).await
    }

    /// Removes every record in the namespace.
    pub async fn clear(&self) -> Result<()> {
        self.ready().await?;
        self.store.clear().await
    }

    // == Listing ==
    /// Lists stored keys as-is, including stale records not yet reclaimed.
    pub async fn keys(&self) -> Result<Vec<String>> {
        self.ready().await?;
        self.store.keys().await
    }

    /// Lists unwrapped values of every valid record.
    pub async fn values(&self) -> Result<Vec<T>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    /// Lists `(key, value)` pairs of every valid record.
    ///
    /// Stale records met along the way are deleted in one call.
    pub async fn entries(&self) -> Result<Vec<(String, T)>> {
        self.ready().await?;

        let now = current_timestamp_ms();
        let mut stale = Vec::new();
        let mut live = Vec::new();
        for (key, raw) in self.store.entries().await? {
            match self.policy.open_at(raw, now) {
                Some(value) => live.push((key, value)),
                None => stale.push(key),
            }
        }

        if !stale.is_empty() {
            self.store.del_many(&stale).await?;
            self.stats.record_evictions(stale.len());
        }

        Ok(live)
    }

    // == Purge ==
    /// Deletes every stale record now, returning how many were removed.
    pub async fn purge_stale(&self) -> Result<usize> {
        self.ready().await?;
        let removed = purge(self.store.as_ref(), &self.policy).await?;
        self.stats.record_evictions(removed);
        Ok(removed)
    }

    // == Stats ==
    pub async fn stats(&self) -> Result<CacheStats> {
        let total = self.keys().await?.len();
        Ok(self.stats.snapshot(total))
    }
}

/// Lists every record and batch-deletes the ones failing `policy`.
async fn purge(store: &dyn KeyValueStore, policy: &EnvelopePolicy) -> Result<usize> {
    let now = current_timestamp_ms();
    let stale: Vec<String> = store
        .entries()
        .await?
        .into_iter()
        .filter(|(_, raw)| !policy.is_live_at(raw, now))
        .map(|(key, _)| key)
        .collect();

    if !stale.is_empty() {
        store.del_many(&stale).await?;
    }
    Ok(stale.len())
}
