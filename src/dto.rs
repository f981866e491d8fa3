use serde::{Deserialize, Serialize};

use crate::models::{
    DonationKind, DonationStatus, OrderStatus, Role, ShippingAddress, ShoeStatus, User,
    VolunteerStatus,
};

/// Data transfer object for registering an account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterDto {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Data transfer object for signing in
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

/// Returned after a successful login or registration
///
/// The token is only ever shown here; the server keeps a digest of it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionDto {
    pub token: String,
    pub user: User,
}

/// Data transfer object for requesting a password reset email
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PasswordResetRequestDto {
    pub email: String,
}

/// Data transfer object for completing a password reset
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PasswordResetConfirmDto {
    pub token: String,
    pub new_password: String,
}

/// Data transfer object for changing a user's role
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateRoleDto {
    pub role: Role,
}

/// Data transfer object for adding a shoe to inventory
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateShoeDto {
    pub name: String,
    pub brand: String,
    pub gender: String,
    pub size: String,
    pub sport: String,
    pub condition: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_key: Option<String>,
    /// Pairs on hand
    pub quantity: i32,
    /// Create the item hidden from the public catalog
    #[serde(default)]
    pub hidden: bool,
    /// The donation these shoes came from
    #[serde(default)]
    pub donation_id: Option<String>,
}

/// Data transfer object for editing a shoe; absent fields are left unchanged
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateShoeDto {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub gender: Option<String>,
    pub size: Option<String>,
    pub sport: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub quantity: Option<i32>,
    /// Hide or unhide the item
    pub hidden: Option<bool>,
}

/// Query parameters for listing shoes
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ShoeQueryDto {
    /// Only shoes with this status
    pub status: Option<ShoeStatus>,
    pub gender: Option<String>,
    /// Any of these sizes (repeat the parameter for several)
    pub size: Vec<String>,
    pub sport: Option<String>,
    pub brand: Option<String>,
    /// Case-insensitive match against name, brand, and description
    pub search: Option<String>,
    /// Include hidden items (admins only)
    pub include_hidden: bool,
}

/// Data transfer object for submitting a donation
///
/// `kind` decides which of the shoe or money fields are required.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateDonationDto {
    pub donor_name: String,
    pub donor_email: String,
    pub kind: DonationKind,
    #[serde(default)]
    pub shoe_count: Option<i32>,
    #[serde(default)]
    pub shoe_description: Option<String>,
    #[serde(default)]
    pub amount_cents: Option<i64>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Data transfer object for moving a donation through its lifecycle
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateDonationStatusDto {
    pub status: DonationStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Query parameters for listing donations
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DonationQueryDto {
    pub status: Option<DonationStatus>,
    pub kind: Option<DonationKind>,
    /// Matches donor name, donor email, or reference ID
    pub search: Option<String>,
}

/// One requested line of an order
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderLineDto {
    pub shoe_id: String,
    #[serde(default = "default_line_quantity")]
    pub quantity: i32,
}

fn default_line_quantity() -> i32 {
    1
}

/// Data transfer object for placing an order
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateOrderDto {
    pub items: Vec<OrderLineDto>,
    pub shipping: ShippingAddress,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Data transfer object for moving an order through its lifecycle
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateOrderStatusDto {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Query parameters for listing orders
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct OrderQueryDto {
    pub status: Option<OrderStatus>,
}

/// Data transfer object for the volunteer sign-up form
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateVolunteerDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Data transfer object for updating a volunteer's status
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateVolunteerStatusDto {
    pub status: VolunteerStatus,
}

/// Query parameters for listing volunteers
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct VolunteerQueryDto {
    pub status: Option<VolunteerStatus>,
}

/// Data transfer object for writing a setting
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateSettingDto {
    pub value: serde_json::Value,
}

/// Data transfer object for sending a test email
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TestEmailDto {
    pub to: String,
}

/// Returned after storing an upload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadResponseDto {
    pub key: String,
    /// Path the file can be fetched from
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// Counts shown on the admin dashboard
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DashboardStatsDto {
    pub donations_by_status: Vec<(DonationStatus, i64)>,
    pub shoes_by_status: Vec<(ShoeStatus, i64)>,
    /// Pairs on hand across visible items
    pub pairs_available: i64,
    pub orders_by_status: Vec<(OrderStatus, i64)>,
    pub volunteers_by_status: Vec<(VolunteerStatus, i64)>,
    /// Sum of recorded money donations that were not cancelled
    pub money_raised_cents: i64,
    pub users: i64,
    pub pending_emails: i64,
}

/// Generic acknowledgement body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageDto {
    pub message: String,
}

impl MessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
