use axum::extract::State;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::extract::Json;
use crate::auth::AuthUser;
use crate::dto::{LoginDto, MessageDto, PasswordResetConfirmDto, PasswordResetRequestDto, RegisterDto, SessionDto};
use crate::errors::ApiError;
use crate::models::{Role, User};
use crate::notify::{self, templates};
use crate::repo;
use crate::AppState;

/// Handler for registering a new account
///
/// This function handles POST requests to `/auth/register`.
/// New accounts always get the `user` role and are signed in straight away.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `payload` - The email, name, and password of the new account
///
/// ### Returns
///
/// A session token and the created user as JSON
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterDto>,
) -> Result<Json<SessionDto>, ApiError> {
    info!("Registering new account");

    let user = repo::create_user(&state.pool, &payload.email, &payload.name, &payload.password, Role::User).await?;
    let token = repo::create_session(&state.pool, &user.get_id(), state.config.session_ttl()).await?;

    info!("Registered user {}", user.get_id());

    Ok(Json(SessionDto { token, user }))
}

/// Handler for signing in
///
/// This function handles POST requests to `/auth/login`.
///
/// ### Returns
///
/// A session token and the user as JSON, or 401 if the credentials are wrong
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginDto>,
) -> Result<Json<SessionDto>, ApiError> {
    debug!("Login attempt");

    let user = repo::authenticate(&state.pool, &payload.email, &payload.password).await?.ok_or_else(|| {
        info!("Rejected login");
        ApiError::Unauthorized
    })?;
    let token = repo::create_session(&state.pool, &user.get_id(), state.config.session_ttl()).await?;

    info!("User {} signed in", user.get_id());

    Ok(Json(SessionDto { token, user }))
}

/// Handler for signing out
///
/// This function handles POST requests to `/auth/logout`. Only the session
/// the request was made with is ended.
#[instrument(skip(state, auth), fields(user_id = %auth.user.get_id()))]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MessageDto>, ApiError> {
    repo::delete_session(&state.pool, &auth.token_hash).await?;
    info!("User signed out");
    Ok(Json(MessageDto::new("Signed out")))
}

/// Handler for fetching the signed-in user
///
/// This function handles GET requests to `/auth/me`.
#[instrument(skip(auth), fields(user_id = %auth.user.get_id()))]
pub async fn me_handler(auth: AuthUser) -> Result<Json<User>, ApiError> {
    Ok(Json(auth.user))
}

/// Handler for requesting a password reset email
///
/// This function handles POST requests to `/auth/password-reset`.
/// The response is the same whether or not the account exists, so the
/// endpoint cannot be used to discover registered addresses.
#[instrument(skip(state, payload))]
pub async fn request_password_reset_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PasswordResetRequestDto>,
) -> Result<Json<MessageDto>, ApiError> {
    match repo::get_user_by_email(&state.pool, &payload.email)? {
        Some(user) => {
            let token = repo::create_password_reset(&state.pool, &user.get_id()).await?;
            let message = templates::password_reset(
                &token,
                &state.config.public_url,
                repo::PASSWORD_RESET_TTL_MINUTES,
            );
            notify::notify(&state.pool, &user.get_email(), message).await;
            info!("Queued password reset for user {}", user.get_id());
        }
        None => debug!("Password reset requested for unknown address"),
    }

    Ok(Json(MessageDto::new(
        "If an account exists for that address, a reset link is on its way",
    )))
}

/// Handler for completing a password reset
///
/// This function handles POST requests to `/auth/password-reset/confirm`.
/// Every existing session of the account is ended.
#[instrument(skip(state, payload))]
pub async fn confirm_password_reset_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PasswordResetConfirmDto>,
) -> Result<Json<MessageDto>, ApiError> {
    let user = repo::redeem_password_reset(&state.pool, &payload.token, &payload.new_password).await?;
    info!("Password reset for user {}", user.get_id());
    Ok(Json(MessageDto::new("Password updated, please sign in again")))
}
