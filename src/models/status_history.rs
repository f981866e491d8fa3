use std::fmt::Display;

use chrono::{DateTime, Utc};
use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};

/// One entry in a donation's or order's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Canonical status name at this point
    pub status: String,
    /// When the change happened
    pub at: DateTime<Utc>,
    /// Optional admin note attached to the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Ordered list of status changes, oldest first, stored as a JSON array in TEXT
///
/// A history is never empty: it is created with the initial status and only
/// grows by appending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(transparent)]
#[diesel(sql_type = Text)]
pub struct StatusHistory(Vec<StatusChange>);

impl StatusHistory {
    /// Starts a history with its initial status
    pub fn starting_with(status: impl Display, at: DateTime<Utc>) -> Self {
        Self(vec![StatusChange {
            status: status.to_string(),
            at,
            note: None,
        }])
    }

    /// Appends a change
    pub fn push(&mut self, status: impl Display, at: DateTime<Utc>, note: Option<String>) {
        self.0.push(StatusChange {
            status: status.to_string(),
            at,
            note,
        });
    }

    pub fn entries(&self) -> &[StatusChange] {
        &self.0
    }

    pub fn latest(&self) -> Option<&StatusChange> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;

    #[test]
    fn test_history_starts_with_initial_status() {
        let now = Utc::now();
        let history = StatusHistory::starting_with(OrderStatus::Pending, now);

        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().status, "pending");
        assert_eq!(history.latest().unwrap().at, now);
    }

    #[test]
    fn test_push_appends_in_order() {
        let start = Utc::now();
        let mut history = StatusHistory::starting_with(OrderStatus::Pending, start);
        history.push(OrderStatus::Confirmed, start + chrono::Duration::minutes(5), None);
        history.push(
            OrderStatus::Shipped,
            start + chrono::Duration::hours(2),
            Some("UPS 1Z999".to_string()),
        );

        let statuses: Vec<&str> = history.entries().iter().map(|c| c.status.as_str()).collect();
        assert_eq!(statuses, vec!["pending", "confirmed", "shipped"]);
        assert_eq!(history.latest().unwrap().note.as_deref(), Some("UPS 1Z999"));
    }

    #[test]
    fn test_json_shape_omits_empty_notes() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let history = StatusHistory::starting_with(OrderStatus::Pending, at);
        let json = serde_json::to_value(&history).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["status"], "pending");
        assert!(json[0].get("note").is_none());
    }
}
