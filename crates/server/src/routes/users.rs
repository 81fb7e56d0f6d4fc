//! User account route handlers.
//!
//! Registration, password login, logout, listing and deletion. Identity for
//! the protected routes comes from the server-side session set at login.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::{delete, get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use admin_console_core::{
    AdminUserId, AdminUserView, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAdminAuth, RequireAdminAuth, RequireIsAdmin, clear_current_admin, set_current_admin,
};
use crate::models::CurrentAdmin;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/me", get(me))
        .route("/users/{id}", delete(delete_user))
}

/// Turn a missing-field list into a 400.
fn require_fields(missing: &[&str]) -> Result<(), AppError> {
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "Missing required fields: {}",
        missing.join(", ")
    )))
}

/// Create an account.
///
/// POST /users/register
#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AdminUserView>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    require_fields(&request.missing_fields())?;

    let user = AuthService::new(state.pool()).register(&request).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Check credentials and start a session.
///
/// POST /users/login
#[instrument(skip(state, session, payload))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    require_fields(&request.missing_fields())?;

    let user = AuthService::new(state.pool()).login(&request).await?;

    set_current_admin(&session, &CurrentAdmin::from(&user)).await?;
    set_sentry_user(user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        user: vec![user.into()],
    }))
}

/// End the session. Succeeds whether or not anyone was logged in.
///
/// POST /users/logout
#[instrument(skip(session, admin))]
async fn logout(
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
) -> Result<Json<MessageResponse>, AppError> {
    clear_current_admin(&session).await?;
    clear_sentry_user();

    if let Some(admin) = admin {
        tracing::info!(user_id = %admin.id, "User logged out");
    }

    Ok(Json(MessageResponse::new("Logged out successfully.")))
}

/// List every account.
///
/// GET /users
#[instrument(skip(state, _admin))]
async fn list_users(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<Json<Vec<AdminUserView>>, AppError> {
    let users = AuthService::new(state.pool()).list_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// The logged-in account, reloaded from the database.
///
/// GET /users/me
#[instrument(skip(state, session, admin), fields(user_id = %admin.id))]
async fn me(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<AdminUserView>, AppError> {
    // The extractor saw the row; it can still vanish before this read
    let Some(user) = AuthService::new(state.pool()).current_user(admin.id).await? else {
        clear_current_admin(&session).await?;
        return Err(AppError::Unauthorized(
            "Account no longer exists".to_string(),
        ));
    };

    Ok(Json(user.into()))
}

/// Delete an account.
///
/// DELETE /users/{id}
#[instrument(skip(state, session, admin, id), fields(admin_id = %admin.id))]
async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    RequireIsAdmin(admin): RequireIsAdmin,
    id: Result<Path<AdminUserId>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id.map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let message = AuthService::new(state.pool()).delete_user(id).await?;

    if id == admin.id {
        clear_current_admin(&session).await?;
    }

    Ok(Json(MessageResponse::new(message)))
}
