//! Repository module
//!
//! This module provides the data access layer for the application.
//! It contains functions for creating, retrieving, updating, and deleting
//! users, sessions, shoes, donations, orders, volunteers, settings, uploads,
//! and outbox emails.
//!
//! Functions return `anyhow::Result`. Failures the caller can act on are
//! raised as a [`RepoError`] so the HTTP layer can map them to status codes.

use thiserror::Error;

mod user_repo;
mod session_repo;
mod shoe_repo;
mod donation_repo;
mod order_repo;
mod volunteer_repo;
mod setting_repo;
mod upload_repo;
mod email_repo;
mod stats_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use session_repo::*;
pub use shoe_repo::*;
pub use donation_repo::*;
pub use order_repo::*;
pub use volunteer_repo::*;
pub use setting_repo::*;
pub use upload_repo::*;
pub use email_repo::*;
pub use stats_repo::*;

/// Domain failures raised by repository functions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Not enough stock for shoe {shoe_id}: requested {requested}, available {available}")]
    InsufficientStock {
        shoe_id: String,
        requested: i32,
        available: i32,
    },
}

/// Rejects empty or whitespace-only required text
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), RepoError> {
    if value.trim().is_empty() {
        return Err(RepoError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Minimal sanity check for an email address
pub(crate) fn require_email(value: &str) -> Result<(), RepoError> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(RepoError::Validation(format!("Invalid email address: {}", value)));
    }
    Ok(())
}
