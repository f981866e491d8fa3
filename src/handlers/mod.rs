//! Web API Handlers
//!
//! This module contains the handlers for the RESTful API endpoints.
//! Each handler is responsible for processing a specific type of HTTP request,
//! checking who is asking, calling the appropriate repository functions,
//! queueing any notification emails, and returning a properly formatted response.

mod admin_handlers;
mod auth_handlers;
mod donation_handlers;
mod extract;
mod order_handlers;
mod setting_handlers;
mod shoe_handlers;
mod upload_handlers;
mod user_handlers;
mod volunteer_handlers;

// Re-export all handlers
pub use admin_handlers::*;
pub use auth_handlers::*;
pub use donation_handlers::*;
pub use order_handlers::*;
pub use setting_handlers::*;
pub use shoe_handlers::*;
pub use upload_handlers::*;
pub use user_handlers::*;
pub use volunteer_handlers::*;
