use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ShoeStatus;

/// A shoe inventory item available for recipients to request
///
/// Maps to the `shoes` table. `quantity` is the number of pairs on hand and
/// `status` tracks availability: visible items are `Available` while stock
/// remains and `OutOfStock` otherwise, unless an admin has hidden them.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::shoes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Shoe {
    /// Unique identifier (UUID v4 as string)
    id: String,

    /// Short sequential number shown to people ("Shoe #42")
    display_id: i32,

    name: String,
    brand: String,
    gender: String,
    size: String,
    sport: String,
    condition: String,
    description: Option<String>,

    /// Storage key of the product photo, if one was uploaded
    image_key: Option<String>,

    /// Pairs on hand
    quantity: i32,

    status: ShoeStatus,

    /// The donation these shoes came from, when known
    donation_id: Option<String>,

    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Descriptive fields of a shoe, shared by creation and listing code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoeDetails {
    pub name: String,
    pub brand: String,
    pub gender: String,
    pub size: String,
    pub sport: String,
    pub condition: String,
    pub description: Option<String>,
    pub image_key: Option<String>,
}

impl Shoe {
    /// Creates a new inventory item
    ///
    /// The status is derived from `quantity`, or `Hidden` when `hidden` is set.
    pub fn new(
        display_id: i32,
        details: ShoeDetails,
        quantity: i32,
        hidden: bool,
        donation_id: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        let status = if hidden {
            ShoeStatus::Hidden
        } else {
            ShoeStatus::for_quantity(quantity)
        };
        Self {
            id: Uuid::new_v4().to_string(),
            display_id,
            name: details.name,
            brand: details.brand,
            gender: details.gender,
            size: details.size,
            sport: details.sport,
            condition: details.condition,
            description: details.description,
            image_key: details.image_key,
            quantity,
            status,
            donation_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_display_id(&self) -> i32 {
        self.display_id
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_brand(&self) -> String {
        self.brand.clone()
    }

    pub fn get_gender(&self) -> String {
        self.gender.clone()
    }

    pub fn get_size(&self) -> String {
        self.size.clone()
    }

    pub fn get_sport(&self) -> String {
        self.sport.clone()
    }

    pub fn get_condition(&self) -> String {
        self.condition.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_image_key(&self) -> Option<String> {
        self.image_key.clone()
    }

    pub fn get_quantity(&self) -> i32 {
        self.quantity
    }

    pub fn get_status(&self) -> ShoeStatus {
        self.status
    }

    pub fn get_donation_id(&self) -> Option<String> {
        self.donation_id.clone()
    }

    /// Whether a recipient can currently request this item
    pub fn is_requestable(&self) -> bool {
        self.status == ShoeStatus::Available && self.quantity > 0
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
