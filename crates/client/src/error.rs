//! Client error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by [`crate::AdminApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The API answered 2xx with a body we cannot use.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Reading or writing the local store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The base URL is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
