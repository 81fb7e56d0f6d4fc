//! Admin user domain types.

use chrono::{DateTime, Utc};

use admin_console_core::{AdminUserId, AdminUserView, Email};

/// An admin user (domain type). Carries no password material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    /// Elevated privilege; only settable outside the register endpoint.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Public JSON representation.
impl From<AdminUser> for AdminUserView {
    fn from(user: AdminUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// An admin user together with its stored password hash, as read for login.
///
/// `Debug` redacts the hash.
#[derive(Clone)]
pub struct AdminUserWithPassword {
    pub user: AdminUser,
    /// argon2 PHC string from `admin_users.password`.
    pub password_hash: String,
}

impl std::fmt::Debug for AdminUserWithPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminUserWithPassword")
            .field("user", &self.user)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
