//! Domain models for the admin console.

pub mod admin_user;
pub mod session;

pub use admin_user::{AdminUser, AdminUserWithPassword};
pub use session::{CurrentAdmin, keys as session_keys};
