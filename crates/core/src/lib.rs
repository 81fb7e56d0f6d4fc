//! Admin Console Core - shared types library.
//!
//! Types used by every admin console component:
//! - `server` - JSON API backed by `PostgreSQL`
//! - `client` - HTTP client used by front ends
//! - `cli` - migrations, bootstrap and terminal front end
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, and the JSON wire format

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
