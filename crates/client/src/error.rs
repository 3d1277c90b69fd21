//! Client error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by the auth context and its transport.
///
/// Missing or insufficient sessions are not errors: guards report them as
/// redirects.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached or its reply could not be read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with anything other than 200.
    #[error("Login rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The issued token is not a JWT with a readable `exp` claim.
    #[error("Token is not a readable JWT")]
    MalformedToken,

    /// The session could not be persisted or cleared.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The server base URL cannot carry a path.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// True when the server refused the credentials (401).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401, .. })
    }
}
