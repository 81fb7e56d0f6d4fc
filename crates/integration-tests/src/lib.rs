//! Integration tests for the admin console.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server
//! cargo run -p admin-console-cli -- migrate
//! cargo run -p admin-console-server
//!
//! # Run the ignored integration tests
//! cargo test -p admin-console-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_API_URI` - Running server (default: `http://127.0.0.1:3001`)
//! - `ADMIN_DATABASE_URL` - Same database as the server, used to bootstrap admins

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use secrecy::SecretString;
use sqlx::PgPool;

use admin_console_client::{AdminApiClient, MemoryStore};
use admin_console_core::{AdminUserId, RegisterRequest};
use admin_console_server::db::{self, AdminUserRepository};
use admin_console_server::services::AuthService;

/// Password used for every account the tests create.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Base URL of the server under test.
#[must_use]
pub fn api_base_url() -> String {
    admin_console_client::default_base_url()
}

/// A fresh client with an empty flag store and cookie jar.
///
/// # Panics
///
/// Panics if the base URL is invalid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn new_client() -> AdminApiClient<MemoryStore> {
    AdminApiClient::new(&api_base_url(), MemoryStore::default()).expect("valid ADMIN_API_URI")
}

/// An email no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{nanos}-{n}@integration.test")
}

/// Registration body for `email` with [`TEST_PASSWORD`].
#[must_use]
pub fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        first_name: "Integration".to_owned(),
        last_name: "Test".to_owned(),
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
    }
}

/// Connect to the server's database.
///
/// # Panics
///
/// Panics if neither `ADMIN_DATABASE_URL` nor `DATABASE_URL` is set or the
/// database is unreachable.
#[allow(clippy::expect_used)]
pub async fn admin_pool() -> PgPool {
    let url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("ADMIN_DATABASE_URL must be set");
    db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to admin database")
}

/// Create an admin directly in the database, as `ac-cli admin create --admin` does.
///
/// # Panics
///
/// Panics if the user cannot be created.
#[allow(clippy::expect_used)]
pub async fn bootstrap_admin(pool: &PgPool, email: &str) -> AdminUserId {
    AuthService::new(pool)
        .create_account(&register_request(email), true)
        .await
        .expect("Failed to bootstrap admin")
        .id
}

/// Number of rows in `admin_users`.
///
/// # Panics
///
/// Panics if the query fails.
#[allow(clippy::expect_used)]
pub async fn user_count(pool: &PgPool) -> i64 {
    AdminUserRepository::new(pool)
        .count()
        .await
        .expect("Failed to count users")
}
