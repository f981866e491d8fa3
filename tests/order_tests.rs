//! Integration tests for orders
//!
//! These cover placing orders against inventory, the per-order limit,
//! recipient cancellation, and the admin fulfilment workflow.

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;
use common::*;

fn order_for(shoe: &Value, quantity: i32) -> Value {
    json!({
        "items": [{ "shoe_id": shoe["id"], "quantity": quantity }],
        "shipping": shipping()
    })
}

/// Tests that an order reserves stock and shows up for its recipient
#[tokio::test]
async fn test_place_order_reserves_stock() {
    let test = create_test_app();
    let admin = admin_token(&test).await;
    let shoe = create_shoe(&test.app, &admin, "Pegasus 40", "8", 1).await;
    let (recipient, recipient_id) = register(&test.app, "jordan@example.org", "Jordan").await;

    let (status, order) = send(&test.app, "POST", "/orders", Some(&recipient), Some(order_for(&shoe, 1))).await;
    assert_eq!(status, StatusCode::OK, "{}", order);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["recipient_id"], recipient_id.as_str());
    assert!(order["reference_id"].as_str().unwrap().starts_with("ORD-"));
    assert_eq!(order["items"][0]["quantity"], 1);

    let (_, after) = send(&test.app, "GET", &format!("/shoes/{}", shoe["id"].as_str().unwrap()), None, None).await;
    assert_eq!(after["quantity"], 0);
    assert_eq!(after["status"], "out_of_stock");

    // The last pair is gone
    let (other, _) = register(&test.app, "casey@example.org", "Casey").await;
    let (status, _) = send(&test.app, "POST", "/orders", Some(&other), Some(order_for(&shoe, 1))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) = send(&test.app, "GET", "/orders/mine", Some(&recipient), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let (status, _) = send(&test.app, "GET", &format!("/orders/{}", order["id"].as_str().unwrap()), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Tests the limit on pairs per order and that orders need a session
#[tokio::test]
async fn test_order_limits() {
    let test = create_test_app();
    let admin = admin_token(&test).await;
    let shoe = create_shoe(&test.app, &admin, "Pegasus 40", "8", 5).await;

    let (status, _) = send(&test.app, "POST", "/orders", None, Some(order_for(&shoe, 1))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (recipient, _) = register(&test.app, "jordan@example.org", "Jordan").await;
    let limit = test.state.config.max_items_per_order;
    let (status, body) = send(&test.app, "POST", "/orders", Some(&recipient), Some(order_for(&shoe, limit + 1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at most"));
}

/// Tests that a recipient can cancel a pending order and stock returns
#[tokio::test]
async fn test_recipient_cancel_restores_stock() {
    let test = create_test_app();
    let admin = admin_token(&test).await;
    let shoe = create_shoe(&test.app, &admin, "Pegasus 40", "8", 2).await;
    let (recipient, _) = register(&test.app, "jordan@example.org", "Jordan").await;

    let (_, order) = send(&test.app, "POST", "/orders", Some(&recipient), Some(order_for(&shoe, 2))).await;
    let order_id = order["id"].as_str().unwrap();

    let (status, cancelled) = send(&test.app, "POST", &format!("/orders/{}/cancel", order_id), Some(&recipient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (_, after) = send(&test.app, "GET", &format!("/shoes/{}", shoe["id"].as_str().unwrap()), None, None).await;
    assert_eq!(after["quantity"], 2);
    assert_eq!(after["status"], "available");

    let (status, _) = send(&test.app, "POST", &format!("/orders/{}/cancel", order_id), Some(&recipient), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

/// Tests the admin fulfilment workflow
#[tokio::test]
async fn test_admin_fulfils_order() {
    let test = create_test_app();
    let admin = admin_token(&test).await;
    let shoe = create_shoe(&test.app, &admin, "Pegasus 40", "8", 1).await;
    let (recipient, _) = register(&test.app, "jordan@example.org", "Jordan").await;
    let (_, order) = send(&test.app, "POST", "/orders", Some(&recipient), Some(order_for(&shoe, 1))).await;
    let status_uri = format!("/orders/{}/status", order["id"].as_str().unwrap());

    for next in ["confirmed", "shipped", "delivered"] {
        let (status, updated) = send(&test.app, "PATCH", &status_uri, Some(&admin), Some(json!({ "status": next }))).await;
        assert_eq!(status, StatusCode::OK, "{}", updated);
        assert_eq!(updated["status"], next);
    }

    let (status, _) = send(&test.app, "PATCH", &status_uri, Some(&admin), Some(json!({ "status": "cancelled" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, delivered) = send(&test.app, "GET", "/orders?status=delivered", Some(&admin), None).await;
    assert_eq!(delivered.as_array().unwrap().len(), 1);

    // Recipients cannot move orders themselves
    let (status, _) = send(&test.app, "PATCH", &status_uri, Some(&recipient), Some(json!({ "status": "cancelled" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// Tests that absurd quantities are a validation error, not a server error
#[tokio::test]
async fn test_overflowing_quantities_rejected() {
    let test = create_test_app();
    let admin = admin_token(&test).await;
    let shoe = create_shoe(&test.app, &admin, "Pegasus 40", "8", 1).await;
    let (recipient, _) = register(&test.app, "jordan@example.org", "Jordan").await;

    let body = json!({
        "items": [
            { "shoe_id": shoe["id"], "quantity": i32::MAX },
            { "shoe_id": shoe["id"], "quantity": i32::MAX }
        ],
        "shipping": shipping()
    });
    let (status, body) = send(&test.app, "POST", "/orders", Some(&recipient), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
