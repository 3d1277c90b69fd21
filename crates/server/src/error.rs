//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. Errors become the JSON
//! envelope `{ "success": false, "message": ... }` with a fixed message per
//! kind; server-side failures are captured to Sentry and logged, and their
//! details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatehouse_core::ErrorBody;
use thiserror::Error;

use crate::services::auth::AuthError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::UserNotFound | AuthError::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message for this error.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::UserNotFound) => "User not found",
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials",
            Self::Auth(_) => "Internal server error",
            Self::BadRequest(_) => "Invalid request body",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;

    async fn body_of(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_rejections_are_401_with_distinct_messages() {
        let (status, body) = body_of(AuthError::UserNotFound.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, ErrorBody::new("User not found"));

        let (status, body) = body_of(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, ErrorBody::new("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let err = AppError::Auth(AuthError::Repository(RepositoryError::DataCorruption(
            "invalid email in database: row 7".to_string(),
        )));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_bad_request() {
        let (status, body) =
            body_of(AppError::BadRequest("missing field `password`".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid request body");
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }
}
