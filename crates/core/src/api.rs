//! JSON bodies for `POST /api/auth/login`.
//!
//! ```text
//! request   {"email": "...", "password": "..."}
//! 200       {"success": true, "message": "...", "token": "...", "user": {...}}
//! 401 / 500 {"success": false, "message": "..."}
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Email, Role, RoleError, UserId};

/// Login request body.
///
/// `Debug` is implemented manually so the password never reaches logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Public view of a user, returned on login and kept in the client session.
///
/// The role travels as a string. Consumers resolve it with
/// [`UserSummary::resolve_role`] so that an unknown role is an explicit error
/// rather than a silent default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Email,
    pub role: String,
}

impl UserSummary {
    #[must_use]
    pub fn new(id: UserId, name: Option<String>, email: Email, role: Role) -> Self {
        Self {
            id,
            name,
            email,
            role: role.as_str().to_owned(),
        }
    }

    /// Parse the role carried by this summary.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::Unrecognized` for anything other than `admin` or
    /// `customer`.
    pub fn resolve_role(&self) -> Result<Role, RoleError> {
        self.role.parse()
    }
}

/// 200 response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSuccess {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

impl LoginSuccess {
    pub const MESSAGE: &'static str = "Login successful";

    #[must_use]
    pub fn new(token: String, user: UserSummary) -> Self {
        Self {
            success: true,
            message: Self::MESSAGE.to_owned(),
            token,
            user,
        }
    }
}

/// Body of every non-200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
