use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata of a stored file; the bytes live in object storage under `key`
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::uploads)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Upload {
    key: String,
    original_name: String,
    content_type: String,
    size_bytes: i64,
    uploaded_by: Option<String>,
    created_at: NaiveDateTime,
}

impl Upload {
    pub fn new(
        key: String,
        original_name: String,
        content_type: String,
        size_bytes: i64,
        uploaded_by: Option<String>,
    ) -> Self {
        Self {
            key,
            original_name,
            content_type,
            size_bytes,
            uploaded_by,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_key(&self) -> String {
        self.key.clone()
    }

    pub fn get_original_name(&self) -> String {
        self.original_name.clone()
    }

    pub fn get_content_type(&self) -> String {
        self.content_type.clone()
    }

    pub fn get_size_bytes(&self) -> i64 {
        self.size_bytes
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
