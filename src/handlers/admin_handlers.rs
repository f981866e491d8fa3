use axum::extract::State;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::extract::{Json, Query};
use crate::auth::AdminUser;
use crate::dto::{DashboardStatsDto, MessageDto, TestEmailDto};
use crate::errors::ApiError;
use crate::models::{Email, EmailStatus};
use crate::notify::{self, templates};
use crate::repo;
use crate::AppState;

/// Default number of outbox rows returned by `/admin/emails`
const DEFAULT_EMAIL_LIMIT: i64 = 100;

/// Query parameters for browsing the outbox
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EmailQueryDto {
    pub status: Option<EmailStatus>,
    pub limit: Option<i64>,
}

/// Handler for the liveness probe
///
/// This function handles GET requests to `/health`. It checks that a
/// database connection can be taken from the pool.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Result<Json<MessageDto>, ApiError> {
    state.pool.get().map_err(|e| ApiError::Database(e.into()))?;
    Ok(Json(MessageDto::new("ok")))
}

/// Handler for dashboard counts
///
/// This function handles GET requests to `/admin/stats`.
#[instrument(skip(state, _admin))]
pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<DashboardStatsDto>, ApiError> {
    Ok(Json(repo::dashboard_stats(&state.pool)?))
}

/// Handler for browsing the email outbox
///
/// This function handles GET requests to `/admin/emails`.
#[instrument(skip(state, _admin))]
pub async fn list_emails_handler(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<EmailQueryDto>,
) -> Result<Json<Vec<Email>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_EMAIL_LIMIT).clamp(1, 1000);
    Ok(Json(repo::list_emails(&state.pool, query.status, limit)?))
}

/// Handler for sending a test email
///
/// This function handles POST requests to `/admin/emails/test`. The email
/// is recorded in the outbox and delivered immediately, so the response
/// reports whether the provider accepted it. A failed attempt stays in the
/// outbox and is retried like any other.
#[instrument(skip(state, admin, payload), fields(admin_id = %admin.0.get_id(), to = %payload.to))]
pub async fn send_test_email_handler(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Json(payload): Json<TestEmailDto>,
) -> Result<Json<MessageDto>, ApiError> {
    let message = templates::test_email();
    let email = repo::enqueue_email(&state.pool, &payload.to, &message.subject, &message.body).await?;

    match state.mailer.deliver(&email).await {
        Ok(()) => {
            repo::mark_email_sent(&state.pool, &email.get_id()).await?;
            let reply = if state.mailer.is_live() {
                format!("Test email sent to {}", email.get_recipient())
            } else {
                format!("Email delivery is not configured; the test email to {} was logged", email.get_recipient())
            };
            info!("{}", reply);
            Ok(Json(MessageDto::new(reply)))
        }
        Err(e) => {
            warn!("Test email failed: {}", e);
            repo::mark_email_failed(&state.pool, &email.get_id(), &e.to_string(), notify::MAX_DELIVERY_ATTEMPTS).await?;
            Ok(Json(MessageDto::new(format!("Delivery failed, will retry: {}", e))))
        }
    }
}
