pub mod auth;
pub mod donation;
pub mod email;
pub mod order;
pub mod setting;
pub mod shoe;
pub mod user;
pub mod volunteer;
