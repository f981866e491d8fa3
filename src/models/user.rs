use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// A registered account: donor, recipient, or admin
///
/// Maps to the `users` table. The password hash is never serialized into
/// API responses.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Unique identifier for the user (UUID v4 as string)
    id: String,

    /// Login email, always stored lowercased
    email: String,

    /// Display name
    name: String,

    /// Encoded salted password hash
    #[serde(skip_serializing, default)]
    password_hash: String,

    /// Access level
    role: Role,

    /// When this account was created
    created_at: NaiveDateTime,

    /// When this account was last updated
    updated_at: NaiveDateTime,
}

impl User {
    /// Creates a new user with a freshly generated ID
    ///
    /// ### Arguments
    ///
    /// * `email` - The login email; it is trimmed and lowercased
    /// * `name` - The display name
    /// * `password_hash` - An already-encoded password hash
    /// * `role` - The access level
    pub fn new(email: &str, name: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Canonical form of an email address used for lookups and uniqueness
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_normalizes_email() {
        let user = User::new("  Donor@Example.ORG ", "Dana".to_string(), "hash".to_string(), Role::User);

        assert_eq!(user.get_email(), "donor@example.org");
        assert_eq!(user.get_role(), Role::User);
        assert!(!user.is_admin());
        assert!(Uuid::parse_str(&user.get_id()).is_ok());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new("a@b.co", "A".to_string(), "sha256$1$00$ff".to_string(), Role::Admin);
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
        assert_eq!(json["email"], "a@b.co");
    }
}
