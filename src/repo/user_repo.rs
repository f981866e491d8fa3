use crate::auth::{hash_password_async, verify_password_async, MIN_PASSWORD_LEN};
use crate::db::{is_unique_violation, DbPool, ExecuteWithRetry};
use crate::models::{normalize_email, Role, User};
use crate::schema::users;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info, warn};

use super::{require_email, require_text, RepoError};

fn require_password(password: &str) -> Result<(), RepoError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RepoError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Creates a new account
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `email` - Login email; stored trimmed and lowercased
/// * `name` - Display name
/// * `password` - Plain-text password, hashed before storage
/// * `role` - Access level of the new account
///
/// ### Returns
///
/// A Result containing the newly created User if successful
///
/// ### Errors
///
/// Returns an error if:
/// - The email, name, or password is invalid (`RepoError::Validation`)
/// - An account with the email already exists (`RepoError::Conflict`)
/// - The database insert operation fails
#[instrument(skip(pool, name, password), fields(email = %email, role = %role))]
pub async fn create_user(pool: &DbPool, email: &str, name: &str, password: &str, role: Role) -> Result<User> {
    debug!("Creating new user");

    require_email(email)?;
    require_text("Name", name)?;
    require_password(password)?;

    let password_hash = hash_password_async(password).await?;
    let conn = &mut pool.get()?;

    let user = User::new(email, name.trim().to_string(), password_hash, role);

    let inserted = diesel::insert_into(users::table)
        .values(user.clone())
        .execute_with_retry(conn)
        .await
        .map_err(anyhow::Error::from);

    match inserted {
        Ok(_) => {
            info!("Successfully created user with id: {}", user.get_id());
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => {
            warn!("Email already registered");
            Err(RepoError::Conflict("An account with this email already exists".to_string()).into())
        }
        Err(e) => Err(e),
    }
}

/// Retrieves a user by ID
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>> {
    debug!("Retrieving user by id");

    let conn = &mut pool.get()?;

    let result = users::table
        .find(user_id)
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Retrieves a user by email, matching case-insensitively
#[instrument(skip(pool), fields(email = %email))]
pub fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    debug!("Retrieving user by email");

    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::email.eq(normalize_email(email)))
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all accounts, oldest first
#[instrument(skip(pool))]
pub fn list_users(pool: &DbPool) -> Result<Vec<User>> {
    debug!("Listing all users");

    let conn = &mut pool.get()?;

    let result = users::table
        .order(users::created_at.asc())
        .load::<User>(conn)?;

    info!("Retrieved {} users", result.len());

    Ok(result)
}

/// Checks an email and password pair
///
/// ### Returns
///
/// The matching User, or None when the email is unknown or the password is
/// wrong. Callers must not reveal which of the two failed.
#[instrument(skip(pool, password), fields(email = %email))]
pub async fn authenticate(pool: &DbPool, email: &str, password: &str) -> Result<Option<User>> {
    debug!("Authenticating user");

    let Some(user) = get_user_by_email(pool, email)? else {
        debug!("No user with this email");
        return Ok(None);
    };

    if verify_password_async(password, user.get_password_hash()).await? {
        Ok(Some(user))
    } else {
        debug!("Password mismatch");
        Ok(None)
    }
}

/// Changes the role of an account
///
/// ### Errors
///
/// Returns `RepoError::NotFound` if the user does not exist.
#[instrument(skip(pool), fields(user_id = %user_id, role = %role))]
pub async fn update_user_role(pool: &DbPool, user_id: &str, role: Role) -> Result<User> {
    debug!("Updating user role");

    let conn = &mut pool.get()?;

    let rows = diesel::update(users::table.find(user_id))
        .set((users::role.eq(role), users::updated_at.eq(Utc::now().naive_utc())))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("User {}", user_id)).into());
    }

    let user = users::table.find(user_id).first::<User>(conn)?;

    info!("User {} is now {}", user_id, role);

    Ok(user)
}

/// Replaces an account's password
///
/// ### Errors
///
/// Returns `RepoError::Validation` if the password is too short and
/// `RepoError::NotFound` if the user does not exist.
#[instrument(skip(pool, password), fields(user_id = %user_id))]
pub async fn set_user_password(pool: &DbPool, user_id: &str, password: &str) -> Result<()> {
    debug!("Setting user password");

    require_password(password)?;

    let password_hash = hash_password_async(password).await?;
    let conn = &mut pool.get()?;

    let rows = diesel::update(users::table.find(user_id))
        .set((
            users::password_hash.eq(password_hash),
            users::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("User {}", user_id)).into());
    }

    info!("Password updated for user {}", user_id);

    Ok(())
}

/// Makes sure an admin account exists for `email`
///
/// An existing account is promoted to admin. A missing one is created with
/// `password`, which is then required.
#[instrument(skip(pool, password), fields(email = %email))]
pub async fn ensure_admin(pool: &DbPool, email: &str, password: Option<&str>) -> Result<User> {
    debug!("Ensuring admin account");

    match get_user_by_email(pool, email)? {
        Some(user) if user.is_admin() => {
            debug!("Account is already an admin");
            Ok(user)
        }
        Some(user) => {
            info!("Promoting existing account to admin");
            update_user_role(pool, &user.get_id(), Role::Admin).await
        }
        None => {
            let password = password.ok_or_else(|| {
                RepoError::Validation("A password is required to create the admin account".to_string())
            })?;
            info!("Creating admin account");
            create_user(pool, email, "Administrator", password, Role::Admin).await
        }
    }
}

#[cfg(test)]
mod tests;
