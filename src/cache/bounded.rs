//! Bounded Memory Cache Module
//!
//! Process-local cache with an optional size limit and FIFO eviction.

use std::collections::HashMap;

use crate::cache::{CacheStats, InsertionOrder};

// == Bounded Memory Cache ==
/// Non-persistent cache that keeps at most `keys_to_keep` entries.
///
/// Eviction follows first-insertion order: overwriting an existing key
/// replaces its value but keeps its original position.
#[derive(Debug)]
pub struct BoundedMemoryCache<T> {
    /// Key-value storage
    entries: HashMap<String, T>,
    /// First-insertion order of keys
    order: InsertionOrder,
    /// Maximum number of entries, None or 0 = unbounded
    keys_to_keep: Option<usize>,
    stats: CacheStats,
}

impl<T> BoundedMemoryCache<T> {
    // == Constructor ==
    /// Creates a cache keeping at most `keys_to_keep` entries.
    ///
    /// `None` or `Some(0)` leaves the cache unbounded.
    pub fn new(keys_to_keep: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            keys_to_keep,
            stats: CacheStats::new(),
        }
    }

    /// Creates a cache with no size limit.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn keys_to_keep(&self) -> Option<usize> {
        self.keys_to_keep.filter(|limit| *limit > 0)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    // == Set ==
    /// Inserts or overwrites `key`, then evicts the oldest insertions until
    /// the cache fits its limit.
    pub fn set(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            self.order.push(&key);
        }
        self.entries.insert(key, value);
        self.keep_most_recent();
    }

    // == Remove ==
    /// Deletes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.remove(key);
        }
        removed
    }

    fn keep_most_recent(&mut self) {
        let Some(limit) = self.keys_to_keep() else {
            return;
        };

        while self.entries.len() > limit {
            match self.order.evict_oldest() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                    self.stats.record_eviction();
                }
                None => break,
            }
        }
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped to respect the size limit.
    pub fn evictions(&self) -> u64 {
        self.stats.evictions
    }

    /// Eviction and size counters.
    ///
    /// Reads take `&self` and are not counted, so `hits` and `misses` stay 0.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}

impl<T> Default for BoundedMemoryCache<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}
