use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use super::*;
use crate::repo::tests::setup_test_db;

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

/// Starts a stand-in email provider answering every POST with `status`
async fn fake_provider(status: StatusCode) -> (String, Captured) {
    let captured = Captured::default();

    async fn receive(
        State((captured, status)): State<(Captured, StatusCode)>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured.requests.lock().unwrap().push((auth, body));
        status
    }

    let app = Router::new()
        .route("/send", post(receive))
        .with_state((captured.clone(), status));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/send", addr), captured)
}

#[tokio::test]
async fn test_log_only_mailer_accepts_everything() {
    let mailer = Mailer::log_only();
    assert!(!mailer.is_live());

    let email = Email::new("dana@example.org".to_string(), "Hi".to_string(), "Body".to_string());
    assert!(mailer.deliver(&email).await.is_ok());
}

#[tokio::test]
async fn test_deliver_posts_json_with_bearer_key() {
    let (url, captured) = fake_provider(StatusCode::OK).await;
    let mailer = Mailer::new(Some(url), Some("secret-key".to_string()), "Team <team@example.org>".to_string());
    assert!(mailer.is_live());

    let email = Email::new("dana@example.org".to_string(), "Thank you".to_string(), "We got it".to_string());
    mailer.deliver(&email).await.unwrap();

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer secret-key"));
    assert_eq!(body["from"], "Team <team@example.org>");
    assert_eq!(body["to"], serde_json::json!(["dana@example.org"]));
    assert_eq!(body["subject"], "Thank you");
    assert_eq!(body["text"], "We got it");
}

#[tokio::test]
async fn test_deliver_reports_provider_rejection() {
    let (url, _captured) = fake_provider(StatusCode::BAD_GATEWAY).await;
    let mailer = Mailer::new(Some(url), None, "team@example.org".to_string());

    let email = Email::new("dana@example.org".to_string(), "Hi".to_string(), "Body".to_string());
    let err = mailer.deliver(&email).await.unwrap_err();

    assert!(matches!(err, MailError::Rejected { status: 502, .. }));
}

#[tokio::test]
async fn test_flush_outbox_sends_pending() {
    let pool = setup_test_db();
    let (url, captured) = fake_provider(StatusCode::OK).await;
    let mailer = Mailer::new(Some(url), None, "team@example.org".to_string());

    notify(&pool, "dana@example.org", templates::test_email()).await;
    notify(&pool, "sam@example.org", templates::test_email()).await;

    let report = flush_outbox(&pool, &mailer).await.unwrap();
    assert_eq!(report, FlushReport { sent: 2, retrying: 0, failed: 0 });
    assert_eq!(captured.requests.lock().unwrap().len(), 2);

    // Nothing left to send
    let report = flush_outbox(&pool, &mailer).await.unwrap();
    assert_eq!(report, FlushReport::default());
}

#[tokio::test]
async fn test_flush_outbox_gives_up_after_max_attempts() {
    let pool = setup_test_db();
    let (url, captured) = fake_provider(StatusCode::INTERNAL_SERVER_ERROR).await;
    let mailer = Mailer::new(Some(url), None, "team@example.org".to_string());

    notify(&pool, "dana@example.org", templates::test_email()).await;

    for _ in 1..MAX_DELIVERY_ATTEMPTS {
        let report = flush_outbox(&pool, &mailer).await.unwrap();
        assert_eq!(report.retrying, 1);
    }
    let report = flush_outbox(&pool, &mailer).await.unwrap();
    assert_eq!(report, FlushReport { sent: 0, retrying: 0, failed: 1 });

    let failed = repo::list_emails(&pool, Some(EmailStatus::Failed), 10).unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].get_attempts(), MAX_DELIVERY_ATTEMPTS);
    assert_eq!(captured.requests.lock().unwrap().len(), MAX_DELIVERY_ATTEMPTS as usize);
}

#[tokio::test]
async fn test_notify_swallows_invalid_recipient() {
    let pool = setup_test_db();

    notify(&pool, "not-an-address", templates::test_email()).await;

    assert!(repo::pending_emails(&pool, 10).unwrap().is_empty());
}
