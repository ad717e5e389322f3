//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use keyval_cache::{api::create_router, AppState, PersistentCacheOptions};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

async fn create_test_app(options: PersistentCacheOptions) -> Router {
    let state = AppState::in_memory(options).unwrap();
    state.cache.ready().await.unwrap();
    create_router(state)
}

async fn default_app() -> Router {
    create_test_app(PersistentCacheOptions::new("api", 1)).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == SET / GET ==

#[tokio::test]
async fn test_set_then_get_roundtrip() {
    let app = default_app().await;

    let response = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "run_1", "value": {"dps": 10450.2, "iterations": 3000}})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("run_1"));

    let response = send(&app, "GET", "/get/run_1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "run_1");
    assert_eq!(json["value"], json!({"dps": 10450.2, "iterations": 3000}));
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = default_app().await;

    let response = send(&app, "GET", "/get/nonexistent", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

// == Batch Endpoints ==

#[tokio::test]
async fn test_set_many_and_get_many() {
    let app = default_app().await;

    let response = send(
        &app,
        "POST",
        "/set_many",
        Some(json!({"entries": [
            {"key": "a", "value": 1},
            {"key": "b", "value": 2},
            {"key": "c", "value": 3}
        ]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["count"], 3);

    let response = send(
        &app,
        "POST",
        "/get_many",
        Some(json!({"keys": ["c", "missing", "a"]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["values"], json!([3, 1]));
}

#[tokio::test]
async fn test_del_many_and_clear() {
    let app = default_app().await;
    send(
        &app,
        "POST",
        "/set_many",
        Some(json!({"entries": [
            {"key": "a", "value": 1},
            {"key": "b", "value": 2},
            {"key": "c", "value": 3}
        ]})),
    )
    .await;

    let response = send(&app, "POST", "/del_many", Some(json!({"keys": ["a", "b"]}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(send(&app, "GET", "/keys", None).await.into_body()).await;
    assert_eq!(json["keys"], json!(["c"]));
    assert_eq!(json["count"], 1);

    let response = send(&app, "DELETE", "/clear", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(send(&app, "GET", "/entries", None).await.into_body()).await;
    assert_eq!(json["entries"], json!([]));
}

// == DELETE ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = default_app().await;
    send(&app, "PUT", "/set", Some(json!({"key": "gone", "value": true}))).await;

    let response = send(&app, "DELETE", "/del/gone", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/get/gone", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == ENTRIES ==

#[tokio::test]
async fn test_entries_unwraps_values() {
    let app = default_app().await;
    send(&app, "PUT", "/set", Some(json!({"key": "k", "value": [1, 2]}))).await;

    let response = send(&app, "GET", "/entries", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["entries"], json!([{"key": "k", "value": [1, 2]}]));
}

// == STATS / HEALTH ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = default_app().await;

    send(&app, "PUT", "/set", Some(json!({"key": "stats_key", "value": "v"}))).await;
    send(&app, "GET", "/get/stats_key", None).await;
    send(&app, "GET", "/get/nonexistent", None).await;

    let response = send(&app, "GET", "/stats", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["namespace"], "api");
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert!(json.get("hit_rate").is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = default_app().await;

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert_eq!(json["sweep"].as_str().unwrap(), "ready");
    assert!(json.get("timestamp").is_some());
}

// == Error Responses ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = default_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = default_app().await;

    let response = send(&app, "PUT", "/set", Some(json!({"key": "", "value": 1}))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_key_in_batch() {
    let app = default_app().await;

    let response = send(&app, "POST", "/get_many", Some(json!({"keys": ["ok", ""]}))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == TTL ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app(PersistentCacheOptions::new("api", 1).with_ttl(1)).await;

    send(&app, "PUT", "/set", Some(json!({"key": "short", "value": "lived"}))).await;
    let response = send(&app, "GET", "/get/short", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = send(&app, "GET", "/get/short", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(send(&app, "GET", "/keys", None).await.into_body()).await;
    assert_eq!(json["count"], 0);
}
