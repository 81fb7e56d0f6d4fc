//! Authentication error types.

use thiserror::Error;

use admin_console_core::AdminUserId;

use super::password::PasswordError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication and user management.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] admin_console_core::EmailError),

    /// Wrong password or unknown email. Deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No user with this ID.
    #[error("User with id {0} not found.")]
    UserNotFound(AdminUserId),

    /// Password hashing or a malformed stored hash.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::UserAlreadyExists,
            other => Self::Repository(other),
        }
    }
}
