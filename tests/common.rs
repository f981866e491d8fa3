#![allow(dead_code)]

//! Common test utilities for New Steps integration tests
//!
//! Each test gets its own application over a fresh shared-cache in-memory
//! database and a temporary upload directory, plus helpers for the
//! requests most tests need: signing up, signing in as admin, and adding
//! inventory.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use newsteps::{config::base_config, create_app, db::init_pool, repo, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@newsteps.example";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// An application under test with direct access to its state
pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
    // Removed when the test finishes
    _uploads: TempDir,
}

/// Creates a test application with an isolated in-memory database
///
/// The database uses a unique shared-cache name so every pooled
/// connection sees the same data. Email delivery is left unconfigured,
/// so notifications are only logged and recorded in the outbox.
pub fn create_test_app() -> TestApp {
    let database_url = format!("file:newsteps_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = init_pool(&database_url).unwrap();
    newsteps::run_migrations(&mut pool.get().unwrap()).unwrap();

    let uploads = TempDir::new().unwrap();
    let mut config = base_config(None);
    config.database_url = database_url;
    config.upload_dir = uploads.path().to_path_buf();
    config.admin_email = Some("team@newsteps.example".to_string());

    let state = Arc::new(AppState::new(pool, config));
    TestApp {
        app: create_app(state.clone()),
        state,
        _uploads: uploads,
    }
}

/// Sends a request and returns the status with the body parsed as JSON
///
/// A body that is not JSON comes back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Registers an account and returns its session token and user ID
pub async fn register(app: &Router, email: &str, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "name": name, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);

    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

/// Creates the admin account and returns a session token for it
pub async fn admin_token(test: &TestApp) -> String {
    repo::ensure_admin(&test.state.pool, ADMIN_EMAIL, Some(ADMIN_PASSWORD))
        .await
        .unwrap();

    let (status, body) = send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Adds an inventory item through the admin API and returns it as JSON
pub async fn create_shoe(app: &Router, admin: &str, name: &str, size: &str, quantity: i32) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/shoes",
        Some(admin),
        Some(json!({
            "name": name,
            "brand": "Nike",
            "gender": "Women",
            "size": size,
            "sport": "Running",
            "condition": "Like New",
            "quantity": quantity
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create shoe failed: {}", body);
    body
}

/// A complete shipping address
pub fn shipping() -> Value {
    json!({
        "name": "Jordan Lee",
        "address_line1": "12 Track Lane",
        "city": "Eugene",
        "state": "OR",
        "postal_code": "97401",
        "country": "US"
    })
}
