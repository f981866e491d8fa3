use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A login session; only the SHA-256 of the bearer token is stored
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    token_hash: String,
    user_id: String,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
}

impl Session {
    pub fn new(token_hash: String, user_id: String, ttl: Duration) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            token_hash,
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn get_token_hash(&self) -> &str {
        &self.token_hash
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_expires_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.expires_at, Utc)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.get_expires_at() <= now
    }
}

/// A single-use password reset grant
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::password_resets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PasswordReset {
    token_hash: String,
    user_id: String,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
    used_at: Option<NaiveDateTime>,
}

impl PasswordReset {
    pub fn new(token_hash: String, user_id: String, ttl: Duration) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            token_hash,
            user_id,
            created_at: now,
            expires_at: now + ttl,
            used_at: None,
        }
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    /// A reset can be redeemed once, before it expires
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && DateTime::<Utc>::from_naive_utc_and_offset(self.expires_at, Utc) > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let session = Session::new("h".to_string(), "u".to_string(), Duration::hours(1));
        let now = Utc::now();

        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::hours(2)));
    }

    #[test]
    fn test_password_reset_redeemable_window() {
        let reset = PasswordReset::new("h".to_string(), "u".to_string(), Duration::minutes(60));
        let now = Utc::now();

        assert!(reset.is_redeemable_at(now));
        assert!(!reset.is_redeemable_at(now + Duration::minutes(61)));
    }
}
