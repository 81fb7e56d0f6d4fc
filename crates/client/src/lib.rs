//! Admin console client.
//!
//! Typed wrappers around every endpoint of the admin console API, for use by
//! front ends. The client keeps the server session in a cookie jar and
//! mirrors the logged-in user's admin flag into a [`LocalStore`] so a UI can
//! decide what to show without a round trip.
//!
//! ```rust,no_run
//! use admin_console_client::{AdminApiClient, MemoryStore};
//! use admin_console_core::LoginRequest;
//!
//! # async fn run() -> Result<(), admin_console_client::ClientError> {
//! let client = AdminApiClient::new("http://127.0.0.1:3001", MemoryStore::default())?;
//! let user = client
//!     .login(&LoginRequest {
//!         email: "ada@example.com".to_owned(),
//!         password: "pw1".to_owned(),
//!     })
//!     .await?;
//! assert_eq!(client.is_admin()?, user.is_admin);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod error;
pub mod store;

pub use client::{ADMIN_FLAG_KEY, AdminApiClient, DEFAULT_BASE_URL, default_base_url};
pub use error::ClientError;
pub use store::{FileStore, LocalStore, MemoryStore, StoreError};
