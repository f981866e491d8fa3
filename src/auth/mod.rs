//! Authentication
//!
//! Password hashing, session tokens, and the request extractors handlers use
//! to require a signed-in user or an admin.

mod extract;
mod password;
mod token;

pub use extract::{AdminUser, AuthUser, MaybeUser};
pub use password::{hash_password, hash_password_async, verify_password, verify_password_async, MIN_PASSWORD_LEN};
pub use token::{generate_token, hash_token};
