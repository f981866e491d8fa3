use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DonationKind, DonationStatus, StatusHistory};

/// A contribution of shoes or money from a donor
///
/// Maps to the `donations` table. Each donation carries a human-readable
/// `reference_id` that donors quote when dropping off or asking about their
/// donation, and a status history recording every lifecycle change.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::donations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Donation {
    /// Unique identifier (UUID v4 as string)
    id: String,

    /// Human-facing reference such as `DON-20250110-7KQ2MX`
    reference_id: String,

    /// The account that submitted the donation, if the donor was signed in
    donor_id: Option<String>,

    donor_name: String,
    donor_email: String,

    kind: DonationKind,

    /// Number of pairs pledged (shoe donations)
    shoe_count: Option<i32>,

    /// Free-text description of the shoes (shoe donations)
    shoe_description: Option<String>,

    /// Amount in cents (money donations)
    amount_cents: Option<i64>,

    /// Identifier from the external payment processor (money donations)
    payment_reference: Option<String>,

    /// Note from the donor
    message: Option<String>,

    status: DonationStatus,

    status_history: StatusHistory,

    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// What the donor is giving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationContent {
    Shoes {
        count: i32,
        description: Option<String>,
    },
    Money {
        amount_cents: i64,
        payment_reference: Option<String>,
    },
}

impl Donation {
    /// Creates a new donation in the `Submitted` status
    pub fn new(
        reference_id: String,
        donor_id: Option<String>,
        donor_name: String,
        donor_email: String,
        content: DonationContent,
        message: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let (kind, shoe_count, shoe_description, amount_cents, payment_reference) = match content {
            DonationContent::Shoes { count, description } => {
                (DonationKind::Shoes, Some(count), description, None, None)
            }
            DonationContent::Money { amount_cents, payment_reference } => {
                (DonationKind::Money, None, None, Some(amount_cents), payment_reference)
            }
        };
        Self {
            id: Uuid::new_v4().to_string(),
            reference_id,
            donor_id,
            donor_name,
            donor_email,
            kind,
            shoe_count,
            shoe_description,
            amount_cents,
            payment_reference,
            message,
            status: DonationStatus::Submitted,
            status_history: StatusHistory::starting_with(DonationStatus::Submitted, now),
            created_at: now.naive_utc(),
            updated_at: now.naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_reference_id(&self) -> String {
        self.reference_id.clone()
    }

    pub fn get_donor_id(&self) -> Option<String> {
        self.donor_id.clone()
    }

    pub fn get_donor_name(&self) -> String {
        self.donor_name.clone()
    }

    pub fn get_donor_email(&self) -> String {
        self.donor_email.clone()
    }

    pub fn get_kind(&self) -> DonationKind {
        self.kind
    }

    pub fn get_shoe_count(&self) -> Option<i32> {
        self.shoe_count
    }

    pub fn get_shoe_description(&self) -> Option<String> {
        self.shoe_description.clone()
    }

    pub fn get_amount_cents(&self) -> Option<i64> {
        self.amount_cents
    }

    pub fn get_payment_reference(&self) -> Option<String> {
        self.payment_reference.clone()
    }

    pub fn get_message(&self) -> Option<String> {
        self.message.clone()
    }

    pub fn get_status(&self) -> DonationStatus {
        self.status
    }

    pub fn get_status_history(&self) -> &StatusHistory {
        &self.status_history
    }

    /// Whether `user_id` submitted this donation
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.donor_id.as_deref() == Some(user_id)
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
