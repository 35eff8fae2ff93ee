//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use kaartmiddag_event::config::EventSettings;
use kaartmiddag_event_store::memory::InMemoryDocumentRepository;
use kaartmiddag_test_support::{FixedClock, SequenceIds};
use tower::ServiceExt;

use kaartmiddag_api::routes;
use kaartmiddag_api::state::AppState;

/// Build application state over an in-memory store with a deterministic
/// clock and id sequence.
pub fn test_state() -> AppState {
    AppState::new(
        Arc::new(FixedClock(
            chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 9, 26, 13, 30, 0).unwrap(),
        )),
        Arc::new(SequenceIds::default()),
        Arc::new(InMemoryDocumentRepository::new()),
        EventSettings::default(),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: &AppState) -> Router {
    routes::app(state.clone())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
