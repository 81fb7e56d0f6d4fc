//! Session-stored identity for authenticated admins.

use serde::{Deserialize, Serialize};

use admin_console_core::{AdminUserId, Email};

use super::admin_user::AdminUser;

/// Minimal identity kept in the server-side session after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
