#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use chef_api::config::ServerConfig;
use chef_api::router::build_app_router;
use chef_api::state::AppState;
use chef_db::MemoryRecipeStore;
use chef_inference::fake::FakeInference;
use chef_pipeline::{DedupCache, ValidationPolicy, WorkflowEngine};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin and a 30-second request
/// timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        static_dir: "static".to_string(),
        database_max_connections: 1,
        inference_timeout_secs: 5,
        reject_invalid_recipes: false,
    }
}

/// Build the full application router over an in-memory store and a scripted
/// inference client.
///
/// Goes through [`build_app_router`] so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) as `main.rs`.
pub fn build_test_app(store: Arc<MemoryRecipeStore>, fake: Arc<FakeInference>) -> Router {
    build_test_app_with_config(store, fake, test_config())
}

pub fn build_test_app_with_config(
    store: Arc<MemoryRecipeStore>,
    fake: Arc<FakeInference>,
    config: ServerConfig,
) -> Router {
    let policy = ValidationPolicy::from_reject_flag(config.reject_invalid_recipes);
    let engine = WorkflowEngine::from_client(
        fake,
        Duration::from_secs(config.inference_timeout_secs),
        policy,
    );
    let dedup = Arc::new(DedupCache::new(store.clone(), engine));

    let state = AppState { store, dedup };
    build_app_router(state, &config)
}

/// Send a request with an optional JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A recipe body accepted by `POST /recipes`.
pub fn recipe_json(title: &str) -> serde_json::Value {
    serde_json::json!({
        "recipe_overview": {
            "title": title,
            "prep_time": "10 minutes",
            "cook_time": "15 minutes",
            "servings": 2,
            "difficulty": "Easy",
            "cuisine_type": "Vietnamese"
        },
        "ingredients": [
            {"item": "rice noodles", "amount": "200", "unit": "g", "notes": null},
            {"item": "garlic", "amount": "3", "unit": "cloves", "notes": "minced"}
        ],
        "instructions": ["Soak the noodles", "Fry the garlic", "Toss together"]
    })
}
