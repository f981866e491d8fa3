//! Integration tests for accounts and sessions
//!
//! These cover sign-up, sign-in, sign-out, and the password reset flow
//! through the HTTP API.

use axum::http::StatusCode;
use newsteps::{models::EmailStatus, repo};
use serde_json::json;

mod common;
use common::*;

/// Tests that a new account can sign in and read its own profile
#[tokio::test]
async fn test_register_login_and_me() {
    let test = create_test_app();
    let (token, user_id) = register(&test.app, "Sam@Example.org", "Sam").await;

    let (status, me) = send(&test.app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["email"], "sam@example.org");
    assert_eq!(me["role"], "user");
    assert!(me.get("password_hash").is_none(), "password hash leaked: {}", me);

    let (status, session) = send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "sam@example.org", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(session["token"].as_str().unwrap(), token);
}

/// Tests that duplicate addresses and wrong passwords are refused
#[tokio::test]
async fn test_register_duplicate_and_bad_login() {
    let test = create_test_app();
    register(&test.app, "sam@example.org", "Sam").await;

    let (status, body) = send(
        &test.app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": "SAM@example.org", "name": "Other Sam", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let (status, _) = send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "sam@example.org", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Tests that signing out ends only the current session
#[tokio::test]
async fn test_logout_ends_session() {
    let test = create_test_app();
    let (token, _) = register(&test.app, "sam@example.org", "Sam").await;

    let (status, _) = send(&test.app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&test.app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Tests the password reset flow from request to new sign-in
///
/// The reset token is taken from the queued email, the way a user would
/// follow the link.
#[tokio::test]
async fn test_password_reset_flow() {
    let test = create_test_app();
    let (old_token, _) = register(&test.app, "sam@example.org", "Sam").await;

    // Unknown addresses get the same reply and no email
    let (status, unknown) = send(
        &test.app,
        "POST",
        "/auth/password-reset",
        None,
        Some(json!({ "email": "nobody@example.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, known) = send(
        &test.app,
        "POST",
        "/auth/password-reset",
        None,
        Some(json!({ "email": "sam@example.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown, known);

    let emails = repo::list_emails(&test.state.pool, Some(EmailStatus::Pending), 10).unwrap();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].get_recipient(), "sam@example.org");
    let body = emails[0].get_body();
    let start = body.find("token=").unwrap() + "token=".len();
    let reset_token: String = body[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect();

    let (status, _) = send(
        &test.app,
        "POST",
        "/auth/password-reset/confirm",
        None,
        Some(json!({ "token": reset_token, "new_password": "a-brand-new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Existing sessions end and the link cannot be reused
    let (status, _) = send(&test.app, "GET", "/auth/me", Some(&old_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &test.app,
        "POST",
        "/auth/password-reset/confirm",
        None,
        Some(json!({ "token": reset_token, "new_password": "another-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &test.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "sam@example.org", "password": "a-brand-new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
