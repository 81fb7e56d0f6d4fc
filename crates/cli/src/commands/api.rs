//! Terminal front end for the admin console API.
//!
//! Each invocation builds an [`AdminApiClient`] over a [`FileStore`]. The
//! session cookie is saved in the store under `session` after each command
//! and restored by the next, so `ac-cli login` followed by `ac-cli list`
//! behaves like a browser tab. Logging out or a 401 drops it.
//!
//! # Usage
//!
//! ```bash
//! ac-cli register -f Ada -l Lovelace -e ada@example.com
//! ac-cli login -e ada@example.com
//! ac-cli list
//! ac-cli delete 7
//! ac-cli status
//! ac-cli logout
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_API_URI` - API base URL (default: `http://127.0.0.1:3001`)
//! - `AC_PASSWORD` - Password for `register`/`login`; read from stdin when unset
//! - `AC_STORE_FILE` - Store file (default: `$XDG_CONFIG_HOME/admin-console/local_storage.json`)

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use admin_console_client::{
    ADMIN_FLAG_KEY, AdminApiClient, ClientError, FileStore, LocalStore, StoreError,
};
use admin_console_core::{AdminUserId, LoginRequest, RegisterRequest};

/// Store key holding the session cookie between invocations.
const SESSION_KEY: &str = "session";

/// Errors from the API front-end commands.
#[derive(Debug, Error)]
pub enum ApiCommandError {
    /// The API call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The local store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading the password failed.
    #[error("Could not read password: {0}")]
    Io(#[from] std::io::Error),

    /// Printing the result failed.
    #[error("Could not encode output: {0}")]
    Output(#[from] serde_json::Error),

    /// No store location could be determined.
    #[error("No store file: set AC_STORE_FILE, XDG_CONFIG_HOME or HOME")]
    NoStorePath,
}

/// A front-end operation.
#[derive(Debug, Clone)]
pub enum ApiAction {
    Register {
        first_name: String,
        last_name: String,
        email: String,
    },
    Login {
        email: String,
    },
    Logout,
    List,
    Delete {
        id: AdminUserId,
    },
    Me,
    Status,
}

/// Run one front-end operation against the API at `api`.
///
/// # Errors
///
/// Returns `ApiCommandError` if the call or the local store fails.
pub async fn run(
    api: &str,
    store_path: Option<PathBuf>,
    action: ApiAction,
) -> Result<(), ApiCommandError> {
    let store_path = store_path
        .or_else(FileStore::default_path)
        .ok_or(ApiCommandError::NoStorePath)?;
    tracing::debug!(api, store = %store_path.display(), "Using admin API");

    let client = AdminApiClient::new(api, FileStore::new(store_path))?;
    if let Some(cookie) = client.store().get(SESSION_KEY)? {
        client.restore_session(&cookie);
    }

    let forget = matches!(action, ApiAction::Logout);
    let result = dispatch(&client, action).await;
    let rejected = matches!(
        &result,
        Err(ApiCommandError::Client(e)) if e.status() == Some(401)
    );
    persist_session(&client, forget || rejected)?;
    result
}

async fn dispatch<S: LocalStore>(
    client: &AdminApiClient<S>,
    action: ApiAction,
) -> Result<(), ApiCommandError> {
    match action {
        ApiAction::Register {
            first_name,
            last_name,
            email,
        } => {
            let password = super::read_password("AC_PASSWORD", "Password")?;
            let user = client
                .register(&RegisterRequest {
                    first_name,
                    last_name,
                    email,
                    password,
                })
                .await?;
            print_json(&user)?;
        }
        ApiAction::Login { email } => {
            let password = super::read_password("AC_PASSWORD", "Password")?;
            let user = client.login(&LoginRequest { email, password }).await?;
            print_json(&user)?;
        }
        ApiAction::Logout => {
            let message = client.logout().await?;
            print_json(&message)?;
        }
        ApiAction::List => {
            let users = client.list_users().await?;
            print_json(&users)?;
        }
        ApiAction::Delete { id } => {
            let message = client.delete_user(id).await?;
            print_json(&message)?;
        }
        ApiAction::Me => {
            let user = client.me().await?;
            print_json(&user)?;
        }
        ApiAction::Status => {
            print_json(&serde_json::json!({
                "admin": client.is_admin()?,
                "session": client.session_cookie().is_some(),
            }))?;
        }
    }

    Ok(())
}

/// Sync the stored session with the cookie jar.
///
/// With `forget` set, or once the server has expired the cookie, the saved
/// session and the admin flag are both removed.
fn persist_session<S: LocalStore>(
    client: &AdminApiClient<S>,
    forget: bool,
) -> Result<(), StoreError> {
    match client.session_cookie() {
        Some(cookie) if !forget => client.store().set(SESSION_KEY, &cookie),
        _ => {
            client.store().remove(SESSION_KEY)?;
            client.store().remove(ADMIN_FLAG_KEY)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiCommandError> {
    let json = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use admin_console_client::MemoryStore;

    use super::*;

    fn client() -> AdminApiClient<MemoryStore> {
        AdminApiClient::new("http://127.0.0.1:9", MemoryStore::default()).unwrap()
    }

    #[test]
    fn test_persist_session_saves_cookie() {
        let client = client();
        client.restore_session("ac_session=abc123");

        persist_session(&client, false).unwrap();

        assert_eq!(
            client.store().get(SESSION_KEY).unwrap().as_deref(),
            Some("ac_session=abc123")
        );
    }

    #[test]
    fn test_persist_session_forget_clears_store() {
        let client = client();
        client.restore_session("ac_session=abc123");
        client.store().set(SESSION_KEY, "ac_session=abc123").unwrap();
        client.store().set(ADMIN_FLAG_KEY, "true").unwrap();

        persist_session(&client, true).unwrap();

        assert_eq!(client.store().get(SESSION_KEY).unwrap(), None);
        assert_eq!(client.store().get(ADMIN_FLAG_KEY).unwrap(), None);
    }

    #[test]
    fn test_persist_session_without_cookie_clears_store() {
        let client = client();
        client.store().set(SESSION_KEY, "ac_session=stale").unwrap();
        client.store().set(ADMIN_FLAG_KEY, "true").unwrap();

        persist_session(&client, false).unwrap();

        assert_eq!(client.store().get(SESSION_KEY).unwrap(), None);
        assert!(!client.is_admin().unwrap());
    }
}
