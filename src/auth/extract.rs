use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;
use tracing::debug;

use crate::errors::ApiError;
use crate::models::User;
use crate::repo;
use crate::AppState;

use super::hash_token;

/// A signed-in user, resolved from an `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Digest of the presented token, identifying the session
    pub token_hash: String,
}

/// A signed-in user with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// The signed-in user if a token was presented, otherwise anonymous
///
/// A token that is present but invalid or expired is still rejected, so a
/// client with a stale session finds out instead of silently acting anonymously.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

/// Reads the bearer token from the request headers
///
/// Returns `Ok(None)` when there is no `Authorization` header at all.
fn bearer_token(parts: &Parts) -> Result<Option<String>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| ApiError::Unauthorized)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?;
    Ok(Some(token.to_string()))
}

/// Looks up the session for a token and returns its user
fn resolve(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let token_hash = hash_token(token);
    let user = repo::get_user_for_session(&state.pool, &token_hash)?.ok_or_else(|| {
        debug!("Rejected unknown or expired session token");
        ApiError::Unauthorized
    })?;
    Ok(AuthUser { user, token_hash })
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(ApiError::Unauthorized)?;
        resolve(state, &token)
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let AuthUser { user, .. } = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            debug!("User {} is not an admin", user.get_id());
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeUser(Some(resolve(state, &token)?.user))),
            None => Ok(MaybeUser(None)),
        }
    }
}

impl MaybeUser {
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(User::is_admin)
    }

    pub fn user_id(&self) -> Option<String> {
        self.0.as_ref().map(User::get_id)
    }
}
