//! Core types for the admin console.

pub mod api;
pub mod email;
pub mod id;

pub use api::{
    AdminUserView, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    SESSION_COOKIE_NAME,
};
pub use email::{Email, EmailError};
pub use id::*;
