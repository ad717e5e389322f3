//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::PersistentCacheOptions;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the namespace documents
    pub data_dir: PathBuf,
    /// Namespace of the served cache
    pub namespace: String,
    /// Current schema version of cached values
    pub schema_version: u32,
    /// TTL in seconds for written entries, None = no time-based expiry
    pub ttl: Option<u64>,
    /// Background stale sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DATA_DIR` - Store directory (default: ./data)
    /// - `CACHE_NAMESPACE` - Cache namespace (default: results)
    /// - `CACHE_SCHEMA_VERSION` - Schema version (default: 1)
    /// - `CACHE_TTL` - TTL in seconds, unset or 0 disables expiry
    /// - `SWEEP_INTERVAL` - Stale sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("CACHE_DATA_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.namespace),
            schema_version: env::var("CACHE_SCHEMA_VERSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.schema_version),
            ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Options for the persistent cache described by this configuration.
    pub fn cache_options(&self) -> PersistentCacheOptions {
        PersistentCacheOptions {
            namespace: self.namespace.clone(),
            version: self.schema_version,
            ttl: self.ttl,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            namespace: "results".to_string(),
            schema_version: 1,
            ttl: None,
            sweep_interval: 60,
            server_port: 3000,
        }
    }
}
