use crate::auth::{generate_token, hash_password_async, hash_token, MIN_PASSWORD_LEN};
use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{PasswordReset, Session, User};
use crate::schema::{password_resets, sessions, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

use super::RepoError;

/// How long a password reset link stays valid
pub const PASSWORD_RESET_TTL_MINUTES: i64 = 60;

/// Opens a session for a user
///
/// ### Returns
///
/// The bearer token. Only its digest is stored, so this is the one chance
/// to hand it to the client.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn create_session(pool: &DbPool, user_id: &str, ttl: Duration) -> Result<String> {
    debug!("Creating session");

    let conn = &mut pool.get()?;

    let token = generate_token();
    let session = Session::new(hash_token(&token), user_id.to_string(), ttl);

    diesel::insert_into(sessions::table)
        .values(session.clone())
        .execute_with_retry(conn)
        .await?;

    info!("Session created, expires at {}", session.get_expires_at());

    Ok(token)
}

/// Resolves a session token digest to its user
///
/// Expired sessions are deleted on sight and resolve to None.
#[instrument(skip(pool, token_hash))]
pub fn get_user_for_session(pool: &DbPool, token_hash: &str) -> Result<Option<User>> {
    debug!("Resolving session");

    let conn = &mut pool.get()?;

    let Some(session) = sessions::table
        .find(token_hash)
        .first::<Session>(conn)
        .optional()?
    else {
        debug!("Unknown session");
        return Ok(None);
    };

    if session.is_expired_at(Utc::now()) {
        debug!("Session expired, removing it");
        diesel::delete(sessions::table.find(token_hash)).execute(conn)?;
        return Ok(None);
    }

    let user = users::table
        .find(session.get_user_id())
        .first::<User>(conn)
        .optional()?;

    Ok(user)
}

/// Ends a session; unknown tokens are ignored
#[instrument(skip(pool, token_hash))]
pub async fn delete_session(pool: &DbPool, token_hash: &str) -> Result<()> {
    debug!("Deleting session");

    let conn = &mut pool.get()?;

    diesel::delete(sessions::table.find(token_hash))
        .execute_with_retry(conn)
        .await?;

    Ok(())
}

/// Ends every session of a user
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn delete_sessions_for_user(pool: &DbPool, user_id: &str) -> Result<usize> {
    debug!("Deleting all sessions for user");

    let conn = &mut pool.get()?;

    let rows = diesel::delete(sessions::table.filter(sessions::user_id.eq(user_id)))
        .execute_with_retry(conn)
        .await?;

    info!("Deleted {} sessions", rows);

    Ok(rows)
}

/// Removes expired sessions and reset grants
#[instrument(skip(pool))]
pub async fn purge_expired_sessions(pool: &DbPool) -> Result<usize> {
    let conn = &mut pool.get()?;
    let now = Utc::now().naive_utc();

    let sessions_removed = diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
        .execute_with_retry(conn)
        .await?;
    let resets_removed = diesel::delete(password_resets::table.filter(password_resets::expires_at.le(now)))
        .execute_with_retry(conn)
        .await?;

    if sessions_removed + resets_removed > 0 {
        info!("Purged {} expired sessions and {} expired resets", sessions_removed, resets_removed);
    }

    Ok(sessions_removed + resets_removed)
}

/// Issues a password reset grant for a user
///
/// ### Returns
///
/// The reset token to be emailed to the user
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn create_password_reset(pool: &DbPool, user_id: &str) -> Result<String> {
    debug!("Creating password reset");

    let conn = &mut pool.get()?;

    let token = generate_token();
    let reset = PasswordReset::new(
        hash_token(&token),
        user_id.to_string(),
        Duration::minutes(PASSWORD_RESET_TTL_MINUTES),
    );

    diesel::insert_into(password_resets::table)
        .values(reset)
        .execute_with_retry(conn)
        .await?;

    info!("Password reset issued");

    Ok(token)
}

/// Redeems a reset token, setting a new password
///
/// The grant is marked used and every existing session of the user is ended,
/// all in one transaction.
///
/// ### Errors
///
/// Returns `RepoError::Validation` if the token is unknown, used, or expired,
/// or if the new password is too short.
#[instrument(skip(pool, token, new_password))]
pub async fn redeem_password_reset(pool: &DbPool, token: &str, new_password: &str) -> Result<User> {
    debug!("Redeeming password reset");

    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RepoError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ))
        .into());
    }

    let password_hash = hash_password_async(new_password).await?;
    let conn = &mut pool.get()?;
    let token_hash = hash_token(token);

    let user = conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let reset = password_resets::table
            .find(&token_hash)
            .first::<PasswordReset>(conn)
            .optional()?
            .filter(|reset| reset.is_redeemable_at(Utc::now()))
            .ok_or_else(|| RepoError::Validation("Reset link is invalid or has expired".to_string()))?;

        let now = Utc::now().naive_utc();
        let user_id = reset.get_user_id();

        diesel::update(password_resets::table.find(&token_hash))
            .set(password_resets::used_at.eq(Some(now)))
            .execute(conn)?;

        diesel::update(users::table.find(&user_id))
            .set((users::password_hash.eq(&password_hash), users::updated_at.eq(now)))
            .execute(conn)?;

        diesel::delete(sessions::table.filter(sessions::user_id.eq(&user_id))).execute(conn)?;

        Ok(users::table.find(&user_id).first::<User>(conn)?)
    })?;

    info!("Password reset redeemed for user {}", user.get_id());

    Ok(user)
}
