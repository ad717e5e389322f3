//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, SweepState};

/// Response body for GET /get/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for POST /get_many
///
/// `values` holds only the valid values, in request order; missing or stale
/// keys leave no slot.
#[derive(Debug, Clone, Serialize)]
pub struct GetManyResponse {
    pub values: Vec<Value>,
}

/// Response body for write operations (PUT /set, POST /set_many)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// Number of keys written
    pub count: usize,
}

impl SetResponse {
    pub fn single(key: &str) -> Self {
        Self {
            message: format!("Key '{}' set successfully", key),
            count: 1,
        }
    }

    pub fn many(count: usize) -> Self {
        Self {
            message: format!("{} keys set successfully", count),
            count,
        }
    }
}

/// Response body for delete operations (DELETE /del/:key, POST /del_many, DELETE /clear)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

impl DeleteResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for GET /keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub count: usize,
    pub keys: Vec<String>,
}

impl KeysResponse {
    pub fn new(keys: Vec<String>) -> Self {
        Self {
            count: keys.len(),
            keys,
        }
    }
}

/// One element of GET /entries
#[derive(Debug, Clone, Serialize)]
pub struct EntryItem {
    pub key: String,
    pub value: Value,
}

/// Response body for GET /entries
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<EntryItem>,
}

impl EntriesResponse {
    pub fn new(entries: Vec<(String, Value)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| EntryItem { key, value })
                .collect(),
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub namespace: String,
    pub schema_version: u32,
    pub hits: u64,
    pub misses: u64,
    /// Stale records reclaimed
    pub evictions: u64,
    /// Records currently stored, stale ones included until reclaimed
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(namespace: impl Into<String>, schema_version: u32, stats: &CacheStats) -> Self {
        Self {
            namespace: namespace.into(),
            schema_version,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" once the startup sweep succeeded
    pub status: String,
    /// State of the startup sweep
    pub sweep: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn from_state(state: &SweepState) -> Self {
        let (status, sweep) = match state {
            SweepState::Ready => ("healthy", "ready".to_string()),
            SweepState::Initializing => ("starting", "initializing".to_string()),
            SweepState::Failed(msg) => ("unhealthy", format!("failed: {}", msg)),
        };
        Self {
            status: status.to_string(),
            sweep,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
