//! Authentication extractors and session helpers.
//!
//! Handlers opt into authentication by taking one of the extractors below.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};
use crate::services::AuthService;
use crate::state::AppState;

/// Extractor that requires a logged-in user whose account still exists.
///
/// The account is reloaded on every request, so a deleted account loses
/// access immediately and its session is ended.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.first_name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Extractor that requires a logged-in user with `is_admin` set on the
/// stored account.
pub struct RequireIsAdmin(pub CurrentAdmin);

/// Rejection for the authentication extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No session, no logged-in user, or the account is gone.
    Unauthorized,
    /// Logged in, but not an admin.
    Forbidden,
    /// The account could not be loaded.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Not logged in").into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only admins can access this resource",
            )
                .into_response(),
            Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Read the admin stored in the request's session, if any.
///
/// A session store failure reads as "not logged in" but is logged.
async fn session_admin(session: &Session) -> Option<CurrentAdmin> {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to read session"))
        .ok()
        .flatten()
}

/// The session's admin, reloaded from `admin_users`.
///
/// A session whose account no longer exists is flushed. A session whose
/// stored snapshot is out of date is rewritten.
async fn verified_admin(parts: &Parts, state: &AppState) -> Result<CurrentAdmin, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;
    let admin = session_admin(session)
        .await
        .ok_or(AuthRejection::Unauthorized)?;

    let user = AuthService::new(state.pool())
        .current_user(admin.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %admin.id, "Failed to load session user");
            AuthRejection::Internal
        })?;

    let Some(user) = user else {
        tracing::info!(user_id = %admin.id, "Session for deleted account ended");
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "Failed to flush session");
        }
        return Err(AuthRejection::Unauthorized);
    };

    let fresh = CurrentAdmin::from(&user);
    if fresh != admin
        && let Err(e) = session.insert(session_keys::CURRENT_ADMIN, &fresh).await
    {
        tracing::warn!(error = %e, "Failed to refresh session");
    }

    Ok(fresh)
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        verified_admin(parts, &state).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireIsAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let admin = verified_admin(parts, &state).await?;

        if !admin.is_admin {
            tracing::warn!(user_id = %admin.id, "Non-admin attempted an admin action");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this does not reject anonymous requests and
/// does not touch the database; the result is the session snapshot.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };
        Ok(Self(session_admin(session).await))
    }
}

/// Store the logged-in admin in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// End the session entirely (logout).
///
/// Deletes the session record from the store and expires the cookie. A
/// request without a session is a no-op.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
