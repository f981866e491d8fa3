//! Data models module
//!
//! This module defines the core data structures used throughout the application.
//! It includes database models that map to database tables, the text-backed
//! status enums they use, and helpers for creating these models.

// Re-export all model types
mod json_text;

mod status;
pub use status::{
    DonationKind, DonationStatus, EmailStatus, OrderStatus, ParseStatusError, Role, ShoeStatus,
    VolunteerStatus,
};

mod status_history;
pub use status_history::{StatusChange, StatusHistory};

mod user;
pub use user::{normalize_email, User};

mod session;
pub use session::{PasswordReset, Session};

mod shoe;
pub use shoe::{Shoe, ShoeDetails};

mod donation;
pub use donation::{Donation, DonationContent};

mod order;
pub use order::{Order, OrderItem, OrderWithItems, ShippingAddress};

mod volunteer;
pub use volunteer::{Volunteer, VolunteerContact};

mod setting;
pub use setting::{Setting, SettingValue};

mod upload;
pub use upload::Upload;

mod email;
pub use email::Email;
