//! Integration tests for site settings

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

/// Tests that admins write settings and anyone can read them
#[tokio::test]
async fn test_settings_round_trip_through_api() {
    let test = create_test_app();
    let admin = admin_token(&test).await;
    let value = json!({ "headline": "Every athlete deserves a pair", "founded": 2019 });

    let (status, _) = send(&test.app, "GET", "/settings/about", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, saved) = send(&test.app, "PUT", "/settings/about", Some(&admin), Some(json!({ "value": value }))).await;
    assert_eq!(status, StatusCode::OK, "{}", saved);
    assert_eq!(saved["value"], value);

    let (status, read) = send(&test.app, "GET", "/settings/about", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["value"], value);

    // Writing again replaces the value
    send(&test.app, "PUT", "/settings/about", Some(&admin), Some(json!({ "value": "short" }))).await;
    let (_, all) = send(&test.app, "GET", "/settings", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["value"], "short");

    let (status, _) = send(&test.app, "DELETE", "/settings/about", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&test.app, "GET", "/settings/about", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Tests that only admins can change settings
#[tokio::test]
async fn test_settings_writes_require_admin() {
    let test = create_test_app();
    let (user, _) = register(&test.app, "sam@example.org", "Sam").await;

    let (status, _) = send(&test.app, "PUT", "/settings/about", Some(&user), Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&test.app, "PUT", "/settings/about", None, Some(json!({ "value": 1 }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
