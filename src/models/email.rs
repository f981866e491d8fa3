use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EmailStatus;

/// An outgoing notification waiting in (or delivered from) the outbox
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::emails)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Email {
    id: String,
    recipient: String,
    subject: String,
    body: String,
    status: EmailStatus,
    /// Delivery attempts made so far
    attempts: i32,
    last_error: Option<String>,
    created_at: NaiveDateTime,
    sent_at: Option<NaiveDateTime>,
}

impl Email {
    pub fn new(recipient: String, subject: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recipient,
            subject,
            body,
            status: EmailStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: Utc::now().naive_utc(),
            sent_at: None,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_recipient(&self) -> &str {
        &self.recipient
    }

    pub fn get_subject(&self) -> &str {
        &self.subject
    }

    pub fn get_body(&self) -> &str {
        &self.body
    }

    pub fn get_status(&self) -> EmailStatus {
        self.status
    }

    pub fn get_attempts(&self) -> i32 {
        self.attempts
    }

    pub fn get_last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at.map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
    }
}
