use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::{Email, EmailStatus};
use crate::schema::emails;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info, warn};

use super::{require_email, RepoError};

/// Adds an email to the outbox
///
/// ### Errors
///
/// Returns `RepoError::Validation` if the recipient is not an email address.
#[instrument(skip(pool, subject, body), fields(recipient = %recipient))]
pub async fn enqueue_email(pool: &DbPool, recipient: &str, subject: &str, body: &str) -> Result<Email> {
    debug!("Enqueueing email");

    require_email(recipient)?;

    let conn = &mut pool.get()?;

    let email = Email::new(recipient.trim().to_string(), subject.to_string(), body.to_string());

    diesel::insert_into(emails::table)
        .values(email.clone())
        .execute_with_retry(conn)
        .await?;

    info!("Queued email {} \"{}\"", email.get_id(), subject);

    Ok(email)
}

/// Lists outbox emails, newest first
#[instrument(skip(pool))]
pub fn list_emails(pool: &DbPool, status: Option<EmailStatus>, limit: i64) -> Result<Vec<Email>> {
    debug!("Listing emails");

    let conn = &mut pool.get()?;

    let mut email_query = emails::table.into_boxed();
    if let Some(status) = status {
        email_query = email_query.filter(emails::status.eq(status));
    }

    let result = email_query
        .order(emails::created_at.desc())
        .limit(limit)
        .load::<Email>(conn)?;

    Ok(result)
}

/// Returns the oldest emails still waiting for delivery
#[instrument(skip(pool))]
pub fn pending_emails(pool: &DbPool, limit: i64) -> Result<Vec<Email>> {
    let conn = &mut pool.get()?;

    let result = emails::table
        .filter(emails::status.eq(EmailStatus::Pending))
        .order(emails::created_at.asc())
        .limit(limit)
        .load::<Email>(conn)?;

    Ok(result)
}

/// Marks an email as delivered
#[instrument(skip(pool), fields(email_id = %email_id))]
pub async fn mark_email_sent(pool: &DbPool, email_id: &str) -> Result<()> {
    let conn = &mut pool.get()?;

    let rows = diesel::update(emails::table.find(email_id))
        .set((
            emails::status.eq(EmailStatus::Sent),
            emails::attempts.eq(emails::attempts + 1),
            emails::last_error.eq(None::<String>),
            emails::sent_at.eq(Some(Utc::now().naive_utc())),
        ))
        .execute_with_retry(conn)
        .await?;

    if rows == 0 {
        return Err(RepoError::NotFound(format!("Email {}", email_id)).into());
    }

    Ok(())
}

/// Records a failed delivery attempt
///
/// The email stays pending until it has been tried `max_attempts` times,
/// then it is marked failed.
///
/// ### Returns
///
/// The status the email ends up in
#[instrument(skip(pool, error), fields(email_id = %email_id))]
pub async fn mark_email_failed(pool: &DbPool, email_id: &str, error: &str, max_attempts: i32) -> Result<EmailStatus> {
    let conn = &mut pool.get()?;

    let email = emails::table
        .find(email_id)
        .first::<Email>(conn)
        .optional()?
        .ok_or_else(|| RepoError::NotFound(format!("Email {}", email_id)))?;

    let attempts = email.get_attempts() + 1;
    let status = if attempts >= max_attempts {
        EmailStatus::Failed
    } else {
        EmailStatus::Pending
    };

    diesel::update(emails::table.find(email_id))
        .set((
            emails::status.eq(status),
            emails::attempts.eq(attempts),
            emails::last_error.eq(Some(error.to_string())),
        ))
        .execute_with_retry(conn)
        .await?;

    if status == EmailStatus::Failed {
        warn!("Giving up on email after {} attempts: {}", attempts, error);
    } else {
        debug!("Delivery attempt {} failed: {}", attempts, error);
    }

    Ok(status)
}
