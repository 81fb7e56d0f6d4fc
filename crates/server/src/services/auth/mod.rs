//! Admin authentication service.
//!
//! Email + password accounts stored in `admin_users`. Passwords are hashed
//! with Argon2id (see [`password`]) before they reach the repository.

mod error;
pub mod password;

pub use error::AuthError;
pub use password::{PasswordError, hash_password, verify_password};

use sqlx::PgPool;
use tracing::instrument;

use admin_console_core::{AdminUserId, Email, LoginRequest, RegisterRequest};

use crate::db::RepositoryError;
use crate::db::admin_users::{AdminUserRepository, NewAdminUser};
use crate::models::admin_user::AdminUser;

/// Admin authentication service.
pub struct AuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Register a new account through the public API.
    ///
    /// The account is never an admin, whatever the caller sent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email is malformed.
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    /// Returns `AuthError::Password` if hashing fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AdminUser, AuthError> {
        self.create_account(request, false).await
    }

    /// Create an account with an explicit admin flag.
    ///
    /// Only the CLI bootstrap calls this with `is_admin = true`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn create_account(
        &self,
        request: &RegisterRequest,
        is_admin: bool,
    ) -> Result<AdminUser, AuthError> {
        let email = Email::parse(&request.email)?;
        let password_hash = hash_password(&request.password)?;

        let user = self
            .users
            .create(&NewAdminUser {
                first_name: request.first_name.trim().to_owned(),
                last_name: request.last_name.trim().to_owned(),
                email,
                password_hash,
                is_admin,
            })
            .await?;

        tracing::info!(user_id = %user.id, is_admin, "Admin user created");
        Ok(user)
    }

    /// Check an email and password.
    ///
    /// Unknown emails and wrong passwords both yield
    /// `AuthError::InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the credentials don't match.
    /// Returns `AuthError::Password` if the stored hash is malformed.
    /// Returns `AuthError::Repository` if the database operation fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AdminUser, AuthError> {
        let Ok(email) = Email::parse(&request.email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some(stored) = self.users.get_by_email(&email).await? else {
            tracing::debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&request.password, &stored.password_hash)? {
            tracing::debug!(user_id = %stored.user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(stored.user)
    }

    /// List every account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn list_users(&self) -> Result<Vec<AdminUser>, AuthError> {
        Ok(self.users.list_all().await?)
    }

    /// Load an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn current_user(&self, id: AdminUserId) -> Result<Option<AdminUser>, AuthError> {
        Ok(self.users.get_by_id(id).await?)
    }

    /// Delete an account and return the confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account has this ID.
    /// Returns `AuthError::Repository` if the database operation fails.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: AdminUserId) -> Result<String, AuthError> {
        match self.users.delete(id).await {
            Ok(()) => {
                tracing::info!(user_id = %id, "Admin user deleted");
                Ok(format!("User with id {id} has been deleted successfully."))
            }
            Err(RepositoryError::NotFound) => Err(AuthError::UserNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: " Ada ".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        }
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_register_login_delete_flow(pool: PgPool) {
        let auth = AuthService::new(&pool);

        let user = auth
            .register(&register_request("ada@x.com", "s3cret"))
            .await
            .unwrap();
        assert_eq!(user.first_name, "Ada");
        assert!(!user.is_admin);

        let duplicate = auth
            .register(&register_request("ADA@x.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(duplicate, AuthError::UserAlreadyExists));
        assert_eq!(auth.list_users().await.unwrap().len(), 1);

        let logged_in = auth.login(&login_request("ada@x.com", "s3cret")).await.unwrap();
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            auth.login(&login_request("ada@x.com", "wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(&login_request("nobody@x.com", "s3cret")).await,
            Err(AuthError::InvalidCredentials)
        ));

        let message = auth.delete_user(user.id).await.unwrap();
        assert_eq!(
            message,
            format!("User with id {} has been deleted successfully.", user.id)
        );
        assert!(auth.current_user(user.id).await.unwrap().is_none());
        assert!(matches!(
            auth.delete_user(user.id).await,
            Err(AuthError::UserNotFound(id)) if id == user.id
        ));
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_create_account_admin(pool: PgPool) {
        let auth = AuthService::new(&pool);

        let admin = auth
            .create_account(&register_request("root@x.com", "pw"), true)
            .await
            .unwrap();
        assert!(admin.is_admin);

        let stored = auth.login(&login_request("root@x.com", "pw")).await.unwrap();
        assert!(stored.is_admin);
    }

    #[sqlx::test(migrator = "crate::db::MIGRATOR")]
    #[ignore = "Requires PostgreSQL (DATABASE_URL)"]
    async fn test_register_rejects_malformed_email(pool: PgPool) {
        let err = AuthService::new(&pool)
            .register(&register_request("not-an-email", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }
}
