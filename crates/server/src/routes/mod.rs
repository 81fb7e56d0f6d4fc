//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health          - Liveness check
//! GET    /health/ready    - Readiness check (database)
//!
//! # Users
//! POST   /users/register  - Create an account (never an admin)
//! POST   /users/login     - Check credentials, start a session
//! POST   /users/logout    - End the session
//! GET    /users           - List accounts (logged in)
//! GET    /users/me        - Current account, reloaded from the database (logged in)
//! DELETE /users/{id}      - Delete an account (admin only)
//! ```

pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the complete router, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(users::router())
}
