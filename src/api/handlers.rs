//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{PersistentCacheOptions, VersionedPersistentCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, DeleteResponse, EntriesResponse, GetManyResponse, GetResponse, HealthResponse,
    KeysRequest, KeysResponse, SetManyRequest, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache is cheap to clone; clones share the store and the readiness gate.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: VersionedPersistentCache<Value>,
}

impl AppState {
    pub fn new(cache: VersionedPersistentCache<Value>) -> Self {
        Self { cache }
    }

    /// Serves a cache over a fresh in-memory store.
    pub fn in_memory(options: PersistentCacheOptions) -> Result<Self> {
        Ok(Self::new(VersionedPersistentCache::in_memory(options)?))
    }

    /// Opens the file-backed cache described by the configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let cache = VersionedPersistentCache::open(config.cache_options(), &config.data_dir).await?;
        Ok(Self::new(cache))
    }
}

fn check(invalid: Option<String>) -> Result<()> {
    match invalid {
        Some(msg) => Err(CacheError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    check(req.validate())?;

    state.cache.set(&req.key, &req.value).await?;

    Ok(Json(SetResponse::single(&req.key)))
}

/// Handler for POST /set_many
pub async fn set_many_handler(
    State(state): State<AppState>,
    Json(req): Json<SetManyRequest>,
) -> Result<Json<SetResponse>> {
    check(req.validate())?;

    let count = req.entries.len();
    let entries = req
        .entries
        .into_iter()
        .map(|entry| (entry.key, entry.value))
        .collect();
    state.cache.set_many(entries).await?;

    Ok(Json(SetResponse::many(count)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    check(validate_key(&key))?;

    match state.cache.get(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for POST /get_many
pub async fn get_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<GetManyResponse>> {
    check(req.validate())?;

    let values = state.cache.get_many(&req.keys).await?;

    Ok(Json(GetManyResponse { values }))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    check(validate_key(&key))?;

    state.cache.del(&key).await?;

    Ok(Json(DeleteResponse::new(format!(
        "Key '{}' deleted successfully",
        key
    ))))
}

/// Handler for POST /del_many
pub async fn delete_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<DeleteResponse>> {
    check(req.validate())?;

    state.cache.del_many(&req.keys).await?;

    Ok(Json(DeleteResponse::new(format!(
        "{} keys deleted successfully",
        req.keys.len()
    ))))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<DeleteResponse>> {
    state.cache.clear().await?;

    Ok(Json(DeleteResponse::new("Cache cleared")))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Result<Json<KeysResponse>> {
    let keys = state.cache.keys().await?;
    Ok(Json(KeysResponse::new(keys)))
}

/// Handler for GET /entries
pub async fn entries_handler(State(state): State<AppState>) -> Result<Json<EntriesResponse>> {
    let entries = state.cache.entries().await?;
    Ok(Json(EntriesResponse::new(entries)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats().await?;

    Ok(Json(StatsResponse::new(
        state.cache.namespace(),
        state.cache.version(),
        &stats,
    )))
}

/// Handler for GET /health
///
/// Reports the startup sweep state without waiting on it.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state.cache.state()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::in_memory(PersistentCacheOptions::new("handlers", 1)).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "test_key".to_string(),
            value: json!({"dps": 42}),
        };
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"dps": 42}));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "to_delete".to_string(),
            value: json!("value"),
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = get_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_many_handler_collapses_missing() {
        let state = test_state();
        state.cache.set("a", &json!(1)).await.unwrap();
        state.cache.set("c", &json!(3)).await.unwrap();

        let req = KeysRequest {
            keys: vec!["a".into(), "b".into(), "c".into()],
        };
        let response = get_many_handler(State(state), Json(req)).await.unwrap();
        assert_eq!(response.values, vec![json!(1), json!(3)]);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = test_state();
        state.cache.ready().await.unwrap();

        let response = health_handler(State(state)).await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let req = SetRequest {
            key: "".to_string(),
            value: json!("value"),
        };
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
