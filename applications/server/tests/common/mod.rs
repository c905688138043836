//! Common test utilities and fixtures

// Each test binary uses a different subset of the helpers
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use roster_core::DisplayZone;
use roster_server::{create_router, AppState};
use roster_storage::MemoryUserStore;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router backed by the in-memory store with its seven sample users
pub fn create_test_app() -> Router {
    let store = Arc::new(MemoryUserStore::with_sample_data());
    create_router(AppState::new(store, DisplayZone::default()))
}

/// Router backed by an empty in-memory store
pub fn create_empty_app() -> Router {
    let store = Arc::new(MemoryUserStore::new());
    create_router(AppState::new(store, DisplayZone::default()))
}

/// Send one request and decode the JSON response body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

/// Send a prepared request and decode the JSON response body
pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

/// Ids of the users in an envelope's `data` array
pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect()
}

/// Execute a GraphQL document and return the response body
pub async fn graphql(app: &Router, query: &str, variables: Value) -> Value {
    let (status, body) = post(
        app,
        "/graphql",
        serde_json::json!({ "query": query, "variables": variables }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

/// Sample data fixtures
pub mod fixtures {
    pub const SAMPLE_COUNT: usize = 7;
    pub const FIRST_EMAIL: &str = "nguyenvana@gmail.com";

    /// Sample names ordered by given name, then family name, then middle
    pub const NAMES_BY_GIVEN_NAME: [&str; 7] = [
        "Tạ Ngọc Linh An",
        "Trần Thị An",
        "Nguyễn Minh Anh",
        "Trần Linh Anh",
        "Trần Vân Anh",
        "Trần Vân Ánh",
        "Trần Linh Bình",
    ];
}
