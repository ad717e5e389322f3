//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the caches, their stores and the HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing store operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Value could not be converted to or from its stored form
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The one-time startup sweep failed; the cache instance is unusable
    #[error("Startup sweep failed: {0}")]
    SweepFailed(String),

    /// Cache was constructed with an unusable configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Store(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::SweepFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Store(_)
            | CacheError::Serialization(_)
            | CacheError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
