//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Returns an error message when `key` is not acceptable.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

fn validate_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Option<String> {
    keys.into_iter().find_map(|key| validate_key(key))
}

/// Request body for PUT /set
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Arbitrary JSON value to store
    pub value: Value,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// A single entry of a batch write
#[derive(Debug, Clone, Deserialize)]
pub struct SetEntry {
    pub key: String,
    pub value: Value,
}

/// Request body for POST /set_many
#[derive(Debug, Clone, Deserialize)]
pub struct SetManyRequest {
    pub entries: Vec<SetEntry>,
}

impl SetManyRequest {
    pub fn validate(&self) -> Option<String> {
        validate_keys(self.entries.iter().map(|entry| &entry.key))
    }
}

/// Request body for POST /get_many and POST /del_many
#[derive(Debug, Clone, Deserialize)]
pub struct KeysRequest {
    pub keys: Vec<String>,
}

impl KeysRequest {
    pub fn validate(&self) -> Option<String> {
        validate_keys(&self.keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": {"dps": 1234.5}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, json!({"dps": 1234.5}));
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: "".to_string(),
            value: json!("test"),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_long_key() {
        let req = SetRequest {
            key: "x".repeat(MAX_KEY_LENGTH + 1),
            value: json!(1),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_set_many_validates_every_key() {
        let json = r#"{"entries": [{"key": "a", "value": 1}, {"key": "", "value": 2}]}"#;
        let req: SetManyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.entries.len(), 2);
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_keys_request() {
        let req: KeysRequest = serde_json::from_str(r#"{"keys": ["a", "b"]}"#).unwrap();
        assert_eq!(req.keys, vec!["a", "b"]);
        assert!(req.validate().is_none());
    }
}
