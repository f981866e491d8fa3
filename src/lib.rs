//! New Steps Project: a donation-matching service for sports shoes
//!
//! This library provides the core functionality of the site: donors give
//! shoes or money, admins turn donated shoes into inventory, and recipients
//! request pairs from the catalog. It includes data models, database access,
//! email notifications, image storage, and a web API.
//!
//! ### Modules
//!
//! - `auth`: Password hashing, session tokens, and request extractors
//! - `config`: Layered server configuration
//! - `db`: Database connection management
//! - `models`: Data structures and their status lifecycles
//! - `repo`: Repository layer for database operations
//! - `notify`: Outbox-backed email notifications
//! - `storage`: Local storage for uploaded images
//! - `handlers`: HTTP handlers for the web API
//!
//! ### Web API
//!
//! Public endpoints cover sign-up and sign-in, browsing the catalog,
//! donating, ordering, and volunteering. Admin endpoints manage inventory,
//! donations, orders, volunteers, settings, uploads, and accounts. See
//! [`create_app`] for the full route table.

pub mod auth;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects for requests and responses
pub mod dto;

/// HTTP error type
pub mod errors;

/// Web API handlers
pub mod handlers;

/// Data models module
pub mod models;

pub mod notify;

/// Human-facing reference IDs for donations and orders
pub mod reference;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

pub mod storage;

#[cfg(test)]
mod test_utils;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use config::Config;
use db::DbPool;
use handlers::*;
use notify::Mailer;
use storage::LocalStorage;

/// Room left in the request body limit for multipart framing around an upload
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub mailer: Mailer,
    pub storage: LocalStorage,
}

impl AppState {
    /// Builds the state for a configuration and an open pool
    pub fn new(pool: DbPool, config: Config) -> Self {
        Self {
            mailer: Mailer::from_config(&config),
            storage: LocalStorage::new(config.upload_dir.clone(), config.max_upload_bytes),
            pool,
            config,
        }
    }
}

/// Builds the CORS layer; no configured origins means any origin is allowed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Creates the application router
///
/// ### Arguments
///
/// * `state` - The shared application state
///
/// ### Returns
///
/// A router serving the whole API, with CORS, request tracing, and a body
/// limit sized for image uploads
pub fn create_app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_handler))
        // Accounts and sessions
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route("/auth/password-reset", post(request_password_reset_handler))
        .route("/auth/password-reset/confirm", post(confirm_password_reset_handler))
        // Shoe catalog
        .route("/shoes", get(list_shoes_handler).post(create_shoe_handler))
        .route(
            "/shoes/{id}",
            get(get_shoe_handler).patch(update_shoe_handler).delete(delete_shoe_handler),
        )
        // Donations
        .route("/donations", post(create_donation_handler).get(list_donations_handler))
        .route("/donations/mine", get(list_my_donations_handler))
        .route("/donations/reference/{reference_id}", get(get_donation_by_reference_handler))
        .route("/donations/{id}", get(get_donation_handler).delete(delete_donation_handler))
        .route("/donations/{id}/status", patch(update_donation_status_handler))
        // Orders
        .route("/orders", post(create_order_handler).get(list_orders_handler))
        .route("/orders/mine", get(list_my_orders_handler))
        .route("/orders/{id}", get(get_order_handler))
        .route("/orders/{id}/cancel", post(cancel_order_handler))
        .route("/orders/{id}/status", patch(update_order_status_handler))
        // Volunteers
        .route("/volunteers", post(create_volunteer_handler).get(list_volunteers_handler))
        .route("/volunteers/{id}", delete(delete_volunteer_handler))
        .route("/volunteers/{id}/status", patch(update_volunteer_status_handler))
        // Site settings
        .route("/settings", get(list_settings_handler))
        .route(
            "/settings/{key}",
            get(get_setting_handler).put(put_setting_handler).delete(delete_setting_handler),
        )
        // Uploaded images
        .route("/uploads", post(create_upload_handler).get(list_uploads_handler))
        .route("/uploads/{key}", get(get_upload_handler).delete(delete_upload_handler))
        // Accounts (admin)
        .route("/users", get(list_users_handler))
        .route("/users/{id}/role", patch(update_user_role_handler))
        // Dashboard
        .route("/admin/stats", get(stats_handler))
        .route("/admin/emails", get(list_emails_handler))
        .route("/admin/emails/test", post(send_test_email_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Runs the embedded migrations
///
/// This function applies all pending database migrations to set up the schema.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if a migration fails to apply.
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    // Define the embedded migrations
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    if !applied.is_empty() {
        tracing::info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}
