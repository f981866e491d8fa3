use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::Upload;
use crate::schema::uploads;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

use super::RepoError;

/// Records the metadata of a stored file
#[instrument(skip(pool, upload), fields(key = %upload.get_key()))]
pub async fn record_upload(pool: &DbPool, upload: Upload) -> Result<Upload> {
    debug!("Recording upload");

    let conn = &mut pool.get()?;

    diesel::insert_into(uploads::table)
        .values(upload.clone())
        .execute_with_retry(conn)
        .await?;

    info!("Recorded upload {} ({} bytes)", upload.get_key(), upload.get_size_bytes());

    Ok(upload)
}

/// Retrieves upload metadata by key
#[instrument(skip(pool), fields(key = %key))]
pub fn get_upload(pool: &DbPool, key: &str) -> Result<Option<Upload>> {
    let conn = &mut pool.get()?;

    let result = uploads::table
        .find(key)
        .first::<Upload>(conn)
        .optional()?;

    Ok(result)
}

/// Lists uploads, newest first
#[instrument(skip(pool))]
pub fn list_uploads(pool: &DbPool) -> Result<Vec<Upload>> {
    debug!("Listing uploads");

    let conn = &mut pool.get()?;

    let result = uploads::table
        .order(uploads::created_at.desc())
        .load::<Upload>(conn)?;

    Ok(result)
}

/// Removes upload metadata; the caller deletes the stored bytes
#[instrument(skip(pool), fields(key = %key))]
pub async fn delete_upload(pool: &DbPool, key: &str) -> Result<()> {
    debug!("Deleting upload record");

    let conn = &mut pool.get()?;

    let rows = diesel::delete(uploads::table.find(key))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Upload {}", key)).into());
    }

    Ok(())
}
