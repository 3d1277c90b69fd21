//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No stored user has this email.
    ///
    /// Kept distinct from `InvalidCredentials` so the HTTP layer can decide
    /// whether to reveal the difference.
    #[error("user not found")]
    UserNotFound,

    /// The user exists but the password does not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Token could not be minted.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The blocking hash task panicked or was cancelled.
    #[error("password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AuthError {
    /// Whether the failure is the caller's fault rather than the server's.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::UserNotFound | Self::InvalidCredentials)
    }
}
