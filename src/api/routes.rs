//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, delete_many_handler, entries_handler, get_handler,
    get_many_handler, health_handler, keys_handler, set_handler, set_many_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a key-value pair
/// - `POST /set_many` - Store several pairs in one batch
/// - `GET /get/:key` - Retrieve a value by key
/// - `POST /get_many` - Retrieve the valid values of several keys
/// - `DELETE /del/:key` - Delete a key
/// - `POST /del_many` - Delete several keys
/// - `DELETE /clear` - Delete every key
/// - `GET /keys` - List stored keys
/// - `GET /entries` - List valid key-value pairs
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/set_many", post(set_many_handler))
        .route("/get/:key", get(get_handler))
        .route("/get_many", post(get_many_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/del_many", post(delete_many_handler))
        .route("/clear", delete(clear_handler))
        .route("/keys", get(keys_handler))
        .route("/entries", get(entries_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
