//! Envelope Module
//!
//! Defines the persisted record wrapping every cached value, and the policy
//! deciding whether a stored record is still valid.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// == Envelope ==
/// Stored wrapper around a cached value.
///
/// Serialized as `{"value": .., "version": .., "expires": ..}` with `expires`
/// omitted when the entry never expires by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The cached value
    pub value: T,
    /// Schema version the value was written under
    pub version: u32,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<u64>,
}

impl<T> Envelope<T> {
    // == Constructor ==
    /// Wraps `value` for schema `version`, expiring `ttl_seconds` from now.
    pub fn new(value: T, version: u32, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            version,
            expires: expiry_from(current_timestamp_ms(), ttl_seconds),
        }
    }
}

/// Computes the expiry timestamp for a TTL in seconds; a zero TTL never expires.
pub fn expiry_from(now_ms: u64, ttl_seconds: Option<u64>) -> Option<u64> {
    ttl_seconds
        .filter(|ttl| *ttl > 0)
        .map(|ttl| now_ms.saturating_add(ttl.saturating_mul(1000)))
}

// == Envelope Policy ==
/// The schema version and TTL a cache writes with and validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopePolicy {
    version: u32,
    ttl: Option<u64>,
}

impl EnvelopePolicy {
    pub fn new(version: u32, ttl: Option<u64>) -> Self {
        Self { version, ttl }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn ttl(&self) -> Option<u64> {
        self.ttl
    }

    // == Validity ==
    /// Checks a record header against this policy at time `now_ms`.
    ///
    /// A record is valid when its version is non-zero and not older than the
    /// configured version, and `now_ms` is strictly before its expiry.
    pub fn is_valid_at(&self, version: Option<u64>, expires: Option<u64>, now_ms: u64) -> bool {
        match version {
            None | Some(0) => return false,
            Some(version) if u64::from(self.version) > version => return false,
            Some(_) => {}
        }

        match expires {
            None => true,
            Some(expires) => now_ms < expires,
        }
    }

    pub fn is_valid(&self, version: Option<u64>, expires: Option<u64>) -> bool {
        self.is_valid_at(version, expires, current_timestamp_ms())
    }

    /// Validates a raw stored record by its `version` and `expires` fields.
    ///
    /// A non-integer `expires` counts as no expiry.
    pub fn is_live_at(&self, raw: &Value, now_ms: u64) -> bool {
        let version = raw.get("version").and_then(Value::as_u64);
        let expires = raw.get("expires").and_then(Value::as_u64);
        self.is_valid_at(version, expires, now_ms)
    }

    // == Seal ==
    /// Wraps a value in a fresh envelope ready for the store.
    pub fn seal<T: Serialize>(&self, value: &T) -> Result<Value> {
        Ok(serde_json::to_value(Envelope::new(value, self.version, self.ttl))?)
    }

    // == Open ==
    /// Unwraps a stored record, or returns None when it is stale or its value
    /// no longer decodes as `T`.
    pub fn open_at<T: DeserializeOwned>(&self, raw: Value, now_ms: u64) -> Option<T> {
        if !self.is_live_at(&raw, now_ms) {
            return None;
        }
        let Value::Object(mut fields) = raw else {
            return None;
        };
        let value = fields.remove("value")?;
        serde_json::from_value(value).ok()
    }

    pub fn open<T: DeserializeOwned>(&self, raw: Value) -> Option<T> {
        self.open_at(raw, current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
