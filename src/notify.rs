//! Email notifications
//!
//! Handlers never talk to the email provider directly. They render a
//! [`Message`] from one of the [`templates`] and put it in the outbox table;
//! a background task calls [`flush_outbox`] to deliver pending rows through
//! the [`Mailer`].

use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::db::DbPool;
use crate::models::{Email, EmailStatus};
use crate::repo;

pub mod templates;

pub use templates::Message;

/// Delivery attempts before an email is marked failed
pub const MAX_DELIVERY_ATTEMPTS: i32 = 5;

/// Most emails sent by one flush
pub const FLUSH_BATCH_SIZE: i64 = 50;

/// Timeout for a single provider request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from handing an email to the provider
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Email request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Email provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// JSON body posted to the provider
#[derive(Serialize, Debug)]
struct OutgoingMessage<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Sends emails through an HTTP email API, or only logs them when no API
/// URL is configured
#[derive(Clone, Debug)]
pub struct Mailer {
    client: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(api_url: Option<String>, api_key: Option<String>, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_url, api_key, from }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.email_api_url.clone(),
            config.email_api_key.clone(),
            config.email_from.clone(),
        )
    }

    /// A mailer that only logs, for tests and local development
    pub fn log_only() -> Self {
        Self::new(None, None, "New Steps Project <no-reply@localhost>".to_string())
    }

    /// Whether emails actually leave the process
    pub fn is_live(&self) -> bool {
        self.api_url.is_some()
    }

    /// Delivers one email
    ///
    /// ### Errors
    ///
    /// Returns `MailError::Request` when the provider cannot be reached and
    /// `MailError::Rejected` when it answers with a non-success status.
    #[instrument(skip(self, email), fields(email_id = %email.get_id(), recipient = %email.get_recipient()))]
    pub async fn deliver(&self, email: &Email) -> Result<(), MailError> {
        let Some(api_url) = &self.api_url else {
            info!(subject = %email.get_subject(), "Email delivery disabled, logging instead:\n{}", email.get_body());
            return Ok(());
        };

        let message = OutgoingMessage {
            from: &self.from,
            to: [email.get_recipient()],
            subject: email.get_subject(),
            text: email.get_body(),
        };

        let mut request = self.client.post(api_url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status: status.as_u16(), body });
        }

        debug!("Provider accepted email");
        Ok(())
    }
}

/// Puts a rendered message in the outbox
///
/// Notifications are a side effect of the request that triggers them, so a
/// failure here is logged and swallowed.
pub async fn notify(pool: &DbPool, recipient: &str, message: Message) {
    if let Err(e) = repo::enqueue_email(pool, recipient, &message.subject, &message.body).await {
        warn!("Could not queue \"{}\" for {}: {:#}", message.subject, recipient, e);
    }
}

/// Outcome of one outbox flush
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    pub retrying: usize,
    pub failed: usize,
}

/// Attempts delivery of every pending email, oldest first
///
/// Each failure counts as an attempt; after `MAX_DELIVERY_ATTEMPTS` the
/// email is marked failed and no longer retried.
#[instrument(skip(pool, mailer))]
pub async fn flush_outbox(pool: &DbPool, mailer: &Mailer) -> Result<FlushReport> {
    let pending = repo::pending_emails(pool, FLUSH_BATCH_SIZE)?;
    let mut report = FlushReport::default();

    for email in pending {
        match mailer.deliver(&email).await {
            Ok(()) => {
                repo::mark_email_sent(pool, &email.get_id()).await?;
                report.sent += 1;
            }
            Err(e) => {
                match repo::mark_email_failed(pool, &email.get_id(), &e.to_string(), MAX_DELIVERY_ATTEMPTS).await? {
                    EmailStatus::Failed => report.failed += 1,
                    _ => report.retrying += 1,
                }
            }
        }
    }

    if report != FlushReport::default() {
        info!(
            "Outbox flush: {} sent, {} retrying, {} failed",
            report.sent, report.retrying, report.failed
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests;
