use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::VolunteerStatus;

/// A volunteer sign-up submitted through the public form
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::volunteers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Volunteer {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    city: Option<String>,
    state: Option<String>,
    /// Comma-separated areas the volunteer wants to help with
    interests: String,
    availability: Option<String>,
    message: Option<String>,
    status: VolunteerStatus,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Contact details from the volunteer form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl Volunteer {
    pub fn new(
        contact: VolunteerContact,
        interests: &[String],
        availability: Option<String>,
        message: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email.trim().to_lowercase(),
            phone: contact.phone,
            city: contact.city,
            state: contact.state,
            interests: interests
                .iter()
                .map(|i| i.trim())
                .filter(|i| !i.is_empty())
                .collect::<Vec<_>>()
                .join(","),
            availability,
            message,
            status: VolunteerStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_phone(&self) -> Option<String> {
        self.phone.clone()
    }

    /// Interests as a list
    pub fn get_interests(&self) -> Vec<String> {
        self.interests
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn get_status(&self) -> VolunteerStatus {
        self.status
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
