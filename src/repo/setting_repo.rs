use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{Setting, SettingValue};
use crate::schema::settings;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

use super::RepoError;

/// Longest accepted setting key
pub const MAX_SETTING_KEY_LEN: usize = 64;

/// Keys are short lowercase slugs such as `about_timeline`
fn validate_key(key: &str) -> Result<(), RepoError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_SETTING_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'-' | b'.'));
    if !valid {
        return Err(RepoError::Validation(format!(
            "Setting keys must be 1-{} characters of a-z, 0-9, '_', '-', or '.'",
            MAX_SETTING_KEY_LEN
        )));
    }
    Ok(())
}

/// Retrieves a setting by key
#[instrument(skip(pool), fields(key = %key))]
pub fn get_setting(pool: &DbPool, key: &str) -> Result<Option<Setting>> {
    debug!("Retrieving setting");

    let conn = &mut pool.get()?;

    let result = settings::table
        .find(key)
        .first::<Setting>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all settings ordered by key
#[instrument(skip(pool))]
pub fn list_settings(pool: &DbPool) -> Result<Vec<Setting>> {
    debug!("Listing settings");

    let conn = &mut pool.get()?;

    let result = settings::table
        .order(settings::key.asc())
        .load::<Setting>(conn)?;

    Ok(result)
}

/// Creates or replaces a setting
///
/// ### Errors
///
/// Returns `RepoError::Validation` if the key is not a valid slug.
#[instrument(skip(pool, value), fields(key = %key))]
pub fn upsert_setting(pool: &DbPool, key: &str, value: serde_json::Value) -> Result<Setting> {
    debug!("Writing setting");

    validate_key(key)?;

    let conn = &mut pool.get()?;

    let setting = Setting::new(key.to_string(), value.clone());

    diesel::insert_into(settings::table)
        .values(setting.clone())
        .on_conflict(settings::key)
        .do_update()
        .set((
            settings::value.eq(SettingValue(value)),
            settings::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    info!("Setting {} saved", key);

    Ok(setting)
}

/// Deletes a setting
#[instrument(skip(pool), fields(key = %key))]
pub async fn delete_setting(pool: &DbPool, key: &str) -> Result<()> {
    debug!("Deleting setting");

    let conn = &mut pool.get()?;

    let rows = diesel::delete(settings::table.find(key))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Setting {}", key)).into());
    }

    info!("Deleted setting {}", key);

    Ok(())
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod prop_tests;
