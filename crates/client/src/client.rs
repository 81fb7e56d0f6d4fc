//! HTTP client for the admin console API.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;

use admin_console_core::{
    AdminUserId, AdminUserView, Email, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, SESSION_COOKIE_NAME,
};

use crate::error::ClientError;
use crate::store::LocalStore;

/// Store key holding the logged-in user's admin flag (`"true"`/`"false"`).
pub const ADMIN_FLAG_KEY: &str = "admin";

/// API base URL when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3001";

/// Resolve the API base URL.
///
/// The `ADMIN_API_URI` environment variable wins, then the value of
/// `ADMIN_API_URI` at build time, then [`DEFAULT_BASE_URL`].
#[must_use]
pub fn default_base_url() -> String {
    std::env::var("ADMIN_API_URI")
        .ok()
        .filter(|uri| !uri.trim().is_empty())
        .or_else(|| option_env!("ADMIN_API_URI").map(str::to_owned))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
}

/// Admin console API client.
///
/// Cookies are kept between calls, so a successful [`login`](Self::login)
/// authenticates every later request made through the same client.
pub struct AdminApiClient<S> {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    store: S,
}

impl<S: LocalStore> AdminApiClient<S> {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `base_url` cannot be parsed.
    /// Returns `ClientError::Http` if the HTTP client fails to build.
    pub fn new(base_url: &str, store: S) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self {
            http,
            jar,
            base_url,
            store,
        })
    }

    /// The API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The local store holding the admin flag.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Session cookie
    // =========================================================================

    /// The current session cookie as `name=value`, if the server set one.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .map(str::trim)
            .find(|pair| {
                pair.split_once('=')
                    .is_some_and(|(name, _)| name == SESSION_COOKIE_NAME)
            })
            .map(str::to_owned)
    }

    /// Reuse a session cookie saved from [`session_cookie`](Self::session_cookie).
    pub fn restore_session(&self, cookie: &str) {
        self.jar
            .add_cookie_str(&format!("{cookie}; Path=/"), &self.base_url);
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Create an account. The server never makes it an admin.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the server's message on a non-2xx
    /// status (409 for a taken email, 400 for missing fields).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AdminUserView, ClientError> {
        log_failure("register", self.post("users/register", request).await)
    }

    /// Log in and record the user's admin flag in the store.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on a non-2xx status (401 for bad
    /// credentials), `ClientError::UnexpectedResponse` if the server returns
    /// no user, and `ClientError::Storage` if the flag cannot be saved.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AdminUserView, ClientError> {
        let result: Result<AdminUserView, ClientError> = async {
            let response: LoginResponse = self.post("users/login", request).await?;
            let user = select_logged_in_user(response.user, &request.email)?;
            self.store
                .set(ADMIN_FLAG_KEY, if user.is_admin { "true" } else { "false" })?;
            Ok(user)
        }
        .await;

        log_failure("login", result)
    }

    /// Log out. The admin flag is removed before the response is checked,
    /// so it is gone even when the request fails.
    ///
    /// # Errors
    ///
    /// Returns the HTTP or API error of the request, or
    /// `ClientError::Storage` if the flag could not be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<MessageResponse, ClientError> {
        let cleared = self.store.remove(ADMIN_FLAG_KEY);
        let response = self.post_empty("users/logout").await;

        let result = cleared.map_err(ClientError::from).and(response);
        log_failure("logout", result)
    }

    /// List every account. Requires a session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 when not logged in.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<AdminUserView>, ClientError> {
        log_failure("list_users", self.get("users").await)
    }

    /// Delete an account. Requires an admin session.
    ///
    /// Deleting the logged-in account ends its session; the admin flag is
    /// removed with it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 (unknown id), 401 or 403.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: AdminUserId) -> Result<MessageResponse, ClientError> {
        let result: Result<MessageResponse, ClientError> = async {
            let url = self.endpoint(&format!("users/{id}"))?;
            let response = self.http.delete(url).send().await?;
            let message = handle_response(response).await?;
            if self.session_cookie().is_none() {
                self.store.remove(ADMIN_FLAG_KEY)?;
            }
            Ok(message)
        }
        .await;

        log_failure("delete_user", result)
    }

    /// Fetch the logged-in account and re-sync the admin flag from it.
    ///
    /// A 401 means there is no logged-in account, so the flag is removed.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 when not logged in.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<AdminUserView, ClientError> {
        let result: Result<AdminUserView, ClientError> = async {
            match self.get::<AdminUserView>("users/me").await {
                Ok(user) => {
                    self.store
                        .set(ADMIN_FLAG_KEY, if user.is_admin { "true" } else { "false" })?;
                    Ok(user)
                }
                Err(e) if e.status() == Some(401) => {
                    self.store.remove(ADMIN_FLAG_KEY)?;
                    Err(e)
                }
                Err(e) => Err(e),
            }
        }
        .await;

        log_failure("me", result)
    }

    /// The stored admin flag. `false` when absent.
    ///
    /// A display hint only; the server checks the session on every request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the store cannot be read.
    pub fn is_admin(&self) -> Result<bool, ClientError> {
        Ok(self.store.get(ADMIN_FLAG_KEY)?.as_deref() == Some("true"))
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http.get(self.endpoint(path)?).send().await?;
        handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http.post(self.endpoint(path)?).send().await?;
        handle_response(response).await
    }
}

impl<S> std::fmt::Debug for AdminApiClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Parse a success body as JSON, or turn an error status into `ClientError::Api`.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let bytes = response.bytes().await?;
        return serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::UnexpectedResponse(format!("invalid response body: {e}")));
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pick the user matching the login email, falling back to the first one.
fn select_logged_in_user(
    users: Vec<AdminUserView>,
    email: &str,
) -> Result<AdminUserView, ClientError> {
    let wanted = Email::parse(email).ok();
    let position = wanted
        .and_then(|wanted| users.iter().position(|user| user.email == wanted))
        .unwrap_or(0);

    users
        .into_iter()
        .nth(position)
        .ok_or_else(|| ClientError::UnexpectedResponse("login returned no user".to_owned()))
}

/// Log a failed call before handing the error back to the caller.
fn log_failure<T>(operation: &'static str, result: Result<T, ClientError>) -> Result<T, ClientError> {
    if let Err(e) = &result {
        tracing::error!(operation, error = %e, "Admin API call failed");
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Json, Router,
        http::StatusCode,
        routing::{delete, get, post},
    };
    use chrono::Utc;

    use super::*;
    use crate::store::MemoryStore;

    fn view(id: i32, email: &str, is_admin: bool) -> AdminUserView {
        AdminUserView {
            id: AdminUserId::new(id),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: Email::parse(email).unwrap(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    async fn stub_login(Json(body): Json<LoginRequest>) -> Result<Json<LoginResponse>, StatusCode> {
        match body.email.as_str() {
            "nobody@x.com" => Ok(Json(LoginResponse { user: Vec::new() })),
            "wrong@x.com" => Err(StatusCode::UNAUTHORIZED),
            _ => Ok(Json(LoginResponse {
                user: vec![
                    view(1, "other@x.com", false),
                    view(2, "boss@x.com", true),
                ],
            })),
        }
    }

    /// Stub API on an ephemeral port.
    async fn stub_server() -> String {
        let app = Router::new()
            .route("/users/login", post(stub_login))
            .route(
                "/users/register",
                post(|| async { (StatusCode::CONFLICT, "User already exists") }),
            )
            .route(
                "/users/logout",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error") }),
            )
            .route("/users", get(|| async { Json(vec![view(1, "a@x.com", false)]) }))
            .route("/users/me", get(|| async { Json(view(2, "boss@x.com", true)) }))
            .route(
                "/users/{id}",
                delete(|| async { (StatusCode::BAD_REQUEST, "User with id 9 not found.") }),
            );

        serve(app).await
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn login_request(email: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_owned(),
            password: "pw1".to_owned(),
        }
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = AdminApiClient::new("not a url", MemoryStore::default()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = AdminApiClient::new("http://host:3001/api", MemoryStore::default()).unwrap();
        assert_eq!(
            client.endpoint("users/login").unwrap().as_str(),
            "http://host:3001/api/users/login"
        );
    }

    #[test]
    fn test_select_logged_in_user() {
        let users = vec![view(1, "a@x.com", false), view(2, "b@x.com", true)];
        assert_eq!(
            select_logged_in_user(users.clone(), "B@X.com").unwrap().id,
            AdminUserId::new(2)
        );
        assert_eq!(
            select_logged_in_user(users, "zzz@x.com").unwrap().id,
            AdminUserId::new(1)
        );
        assert!(matches!(
            select_logged_in_user(Vec::new(), "a@x.com"),
            Err(ClientError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_session_cookie_round_trip() {
        let client = AdminApiClient::new("http://127.0.0.1:3001", MemoryStore::default()).unwrap();
        assert_eq!(client.session_cookie(), None);

        client.restore_session("ac_session=abc123");
        assert_eq!(client.session_cookie().as_deref(), Some("ac_session=abc123"));
    }

    #[tokio::test]
    async fn test_login_stores_flag_of_matching_user() {
        let client = AdminApiClient::new(&stub_server().await, MemoryStore::default()).unwrap();

        let user = client.login(&login_request("boss@x.com")).await.unwrap();

        assert_eq!(user.id, AdminUserId::new(2));
        assert!(client.is_admin().unwrap());
        assert_eq!(
            client.store().get(ADMIN_FLAG_KEY).unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_login_empty_user_list() {
        let client = AdminApiClient::new(&stub_server().await, MemoryStore::default()).unwrap();

        let err = client.login(&login_request("nobody@x.com")).await.unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
        assert!(!client.is_admin().unwrap());
    }

    #[tokio::test]
    async fn test_login_failure_leaves_flag_unset() {
        let client = AdminApiClient::new(&stub_server().await, MemoryStore::default()).unwrap();

        let err = client.login(&login_request("wrong@x.com")).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(client.store().get(ADMIN_FLAG_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_flag_even_on_failure() {
        let client = AdminApiClient::new(&stub_server().await, MemoryStore::default()).unwrap();
        client.store().set(ADMIN_FLAG_KEY, "true").unwrap();

        let err = client.logout().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(client.store().get(ADMIN_FLAG_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_conflict_carries_message() {
        let client = AdminApiClient::new(&stub_server().await, MemoryStore::default()).unwrap();
        let request = RegisterRequest {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@x.com".to_owned(),
            password: "pw1".to_owned(),
        };

        match client.register(&request).await.unwrap_err() {
            ClientError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "User already exists");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_me_resyncs_flag() {
        let client = AdminApiClient::new(&stub_server().await, MemoryStore::default()).unwrap();
        client.store().set(ADMIN_FLAG_KEY, "false").unwrap();

        let user = client.me().await.unwrap();

        assert!(user.is_admin);
        assert!(client.is_admin().unwrap());
    }

    #[tokio::test]
    async fn test_me_unauthorized_clears_flag() {
        let base = serve(Router::new().route(
            "/users/me",
            get(|| async { (StatusCode::UNAUTHORIZED, "Not logged in") }),
        ))
        .await;
        let client = AdminApiClient::new(&base, MemoryStore::default()).unwrap();
        client.store().set(ADMIN_FLAG_KEY, "true").unwrap();

        let err = client.me().await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(!client.is_admin().unwrap());
        assert_eq!(client.store().get(ADMIN_FLAG_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_deleting_own_account_clears_flag() {
        let base = serve(Router::new().route(
            "/users/{id}",
            delete(|| async {
                (
                    [(
                        axum::http::header::SET_COOKIE,
                        "ac_session=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
                    )],
                    Json(MessageResponse::new(
                        "User with id 2 has been deleted successfully.",
                    )),
                )
            }),
        ))
        .await;
        let client = AdminApiClient::new(&base, MemoryStore::default()).unwrap();
        client.restore_session("ac_session=abc123");
        client.store().set(ADMIN_FLAG_KEY, "true").unwrap();

        client.delete_user(AdminUserId::new(2)).await.unwrap();

        assert_eq!(client.session_cookie(), None);
        assert!(!client.is_admin().unwrap());
    }

    #[tokio::test]
    async fn test_deleting_other_account_keeps_flag() {
        let base = serve(Router::new().route(
            "/users/{id}",
            delete(|| async {
                Json(MessageResponse::new(
                    "User with id 3 has been deleted successfully.",
                ))
            }),
        ))
        .await;
        let client = AdminApiClient::new(&base, MemoryStore::default()).unwrap();
        client.restore_session("ac_session=abc123");
        client.store().set(ADMIN_FLAG_KEY, "true").unwrap();

        client.delete_user(AdminUserId::new(3)).await.unwrap();

        assert!(client.session_cookie().is_some());
        assert!(client.is_admin().unwrap());
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let client = AdminApiClient::new(&stub_server().await, MemoryStore::default()).unwrap();

        let users = client.list_users().await.unwrap();
        assert_eq!(users.len(), 1);

        let err = client.delete_user(AdminUserId::new(9)).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "API error: 400 - User with id 9 not found."
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AdminApiClient::new(&format!("http://{addr}"), MemoryStore::default()).unwrap();
        let err = client.list_users().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
