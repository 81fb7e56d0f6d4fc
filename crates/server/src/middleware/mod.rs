//! HTTP middleware for the API.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. CORS (credentialed requests from configured origins)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler with the extractors in [`auth`].

pub mod auth;
pub mod cors;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, RequireIsAdmin, clear_current_admin, set_current_admin,
};
pub use cors::create_cors_layer;
pub use session::{
    SESSION_COOKIE_NAME, SessionStoreError, create_session_layer, create_session_store,
};
