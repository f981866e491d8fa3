use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};

/// Free-form JSON content of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(transparent)]
#[diesel(sql_type = Text)]
pub struct SettingValue(pub serde_json::Value);

/// A piece of site-configurable content, such as the "About Us" timeline
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Setting {
    key: String,
    value: SettingValue,
    updated_at: NaiveDateTime,
}

impl Setting {
    pub fn new(key: String, value: serde_json::Value) -> Self {
        Self {
            key,
            value: SettingValue(value),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_key(&self) -> String {
        self.key.clone()
    }

    pub fn get_value(&self) -> &serde_json::Value {
        &self.value.0
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
