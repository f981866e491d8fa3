use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OrderStatus, StatusHistory};

/// Where an order ships to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A recipient's request for one or more inventory items
///
/// Maps to the `orders` table; the requested items live in `order_items`.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Order {
    /// Unique identifier (UUID v4 as string)
    id: String,

    /// Human-facing reference such as `ORD-20250110-7KQ2MX`
    reference_id: String,

    /// The account that placed the order
    recipient_id: String,

    shipping_name: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    phone: Option<String>,

    notes: Option<String>,

    status: OrderStatus,

    status_history: StatusHistory,

    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// One line of an order
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderItem {
    pub order_id: String,
    pub shoe_id: String,
    pub quantity: i32,
}

/// An order together with its lines, as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Creates a new order in the `Pending` status
    pub fn new(
        reference_id: String,
        recipient_id: String,
        address: ShippingAddress,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            reference_id,
            recipient_id,
            shipping_name: address.name,
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            phone: address.phone,
            notes,
            status: OrderStatus::Pending,
            status_history: StatusHistory::starting_with(OrderStatus::Pending, now),
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

    pub fn get_recipient_id(&self) -> String {
        self.recipient_id.clone()
    }

    pub fn get_shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            name: self.shipping_name.clone(),
            address_line1: self.address_line1.clone(),
            address_line2: self.address_line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            phone: self.phone.clone(),
        }
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_status(&self) -> OrderStatus {
        self.status
    }

    pub fn get_status_history(&self) -> &StatusHistory {
        &self.status_history
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.recipient_id == user_id
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
