//! JSON wire format shared by the server routes and the HTTP client.
//!
//! Request bodies deserialize leniently: every field defaults to an empty
//! string and unknown fields (such as a client-supplied `isAdmin`) are
//! ignored. Presence is checked afterwards with `missing_fields`, so a
//! missing field becomes a readable 400 instead of a deserializer error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::AdminUserId;

/// Name of the session cookie set by `POST /users/login`.
pub const SESSION_COOKIE_NAME: &str = "ac_session";

/// Body of `POST /users/register`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Names of required fields that are missing.
    ///
    /// Names and email count as missing when blank; the password only when
    /// empty, since spaces are valid password characters.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing: Vec<_> = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if self.password.is_empty() {
            missing.push("password");
        }
        missing
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /users/login`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Names of required fields that are missing: a blank email or an
    /// empty password.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        missing
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Public representation of an admin user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserView {
    pub id: AdminUserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Body returned by `POST /users/login`.
///
/// `user` holds exactly the authenticated account; the list shape is kept
/// for front ends that read `user[0]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: Vec<AdminUserView>,
}

/// Confirmation body for logout and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_ignores_is_admin() {
        let body = r#"{
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@x.com",
            "password": "pw1",
            "isAdmin": true,
            "is_admin": true
        }"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.email, "ada@x.com");
        assert!(req.missing_fields().is_empty());
    }

    #[test]
    fn test_register_request_reports_missing_fields() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"first_name": " ", "email": "a@x.com"}"#).unwrap();
        assert_eq!(
            req.missing_fields(),
            vec!["first_name", "last_name", "password"]
        );
    }

    #[test]
    fn test_login_request_reports_missing_fields() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.missing_fields(), vec!["email", "password"]);
    }

    #[test]
    fn test_whitespace_password_is_present() {
        let register = RegisterRequest {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@x.com".to_owned(),
            password: "   ".to_owned(),
        };
        assert!(register.missing_fields().is_empty());

        let login = LoginRequest {
            email: " ".to_owned(),
            password: " ".to_owned(),
        };
        assert_eq!(login.missing_fields(), vec!["email"]);
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let req = LoginRequest {
            email: "a@x.com".to_owned(),
            password: "hunter2".to_owned(),
        };
        let debug_output = format!("{req:?}");
        assert!(debug_output.contains("a@x.com"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_login_response_shape() {
        let json = r#"{"user":[{
            "id": 3,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@x.com",
            "is_admin": false,
            "created_at": "2026-01-01T00:00:00Z"
        }]}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        let first = resp.user.first().unwrap();
        assert_eq!(first.id, AdminUserId::new(3));
        assert!(!first.is_admin);
    }
}
