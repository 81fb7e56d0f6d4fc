//! Admin user bootstrap.
//!
//! The API never creates admins, so the first admin is created here,
//! directly in the database.
//!
//! # Usage
//!
//! ```bash
//! AC_ADMIN_PASSWORD=... ac-cli admin create -f Ada -l Lovelace -e ada@example.com --admin
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `AC_ADMIN_PASSWORD` - Password for the new user; read from stdin when unset

use thiserror::Error;

use admin_console_core::{AdminUserId, RegisterRequest};
use admin_console_server::db;
use admin_console_server::services::{AuthError, AuthService};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading the password failed.
    #[error("Could not read password: {0}")]
    Io(#[from] std::io::Error),

    /// A required field is empty.
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    /// Creating the user failed (bad email, duplicate, database).
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a user directly in the database.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `AdminError` if input is missing, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    first_name: &str,
    last_name: &str,
    email: &str,
    is_admin: bool,
) -> Result<AdminUserId, AdminError> {
    dotenvy::dotenv().ok();

    let password = super::read_password("AC_ADMIN_PASSWORD", "Password")?;
    let request = RegisterRequest {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        email: email.to_owned(),
        password,
    };

    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(AdminError::MissingFields(missing.join(", ")));
    }

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(&database_url).await?;

    let user = AuthService::new(&pool)
        .create_account(&request, is_admin)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Admin: {}",
        user.id,
        user.email,
        user.is_admin
    );

    Ok(user.id)
}
