//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, password login and user management

pub mod auth;

pub use auth::{AuthError, AuthService};
