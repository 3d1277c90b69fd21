//! The signed-in session held by the client.

use chrono::{DateTime, Utc};
use gatehouse_core::{LoginSuccess, Role, RoleError, UserSummary};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Token and user returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
    /// Copied from the token's `exp` claim.
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

impl Session {
    /// Build a session from a login response.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::MalformedToken` if the token has no readable
    /// `exp` claim.
    pub fn from_login(success: LoginSuccess) -> Result<Self, ClientError> {
        let expires_at = token_expiry(&success.token)?;
        Ok(Self {
            token: success.token,
            user: success.user,
            expires_at,
        })
    }

    /// The user's role, or an error naming a role this client does not know.
    ///
    /// # Errors
    ///
    /// Returns `RoleError::Unrecognized` for any role other than `admin` or
    /// `customer`.
    pub fn role(&self) -> Result<Role, RoleError> {
        self.user.resolve_role()
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Read the `exp` claim of a token without checking its signature.
///
/// The client never holds the signing secret; the server verifies the
/// signature on every use.
///
/// # Errors
///
/// Returns `ClientError::MalformedToken` if the token cannot be decoded or
/// carries no `exp` claim.
pub fn token_expiry(token: &str) -> Result<DateTime<Utc>, ClientError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;

    let data =
        jsonwebtoken::decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|_| ClientError::MalformedToken)?;

    DateTime::from_timestamp(data.claims.exp, 0).ok_or(ClientError::MalformedToken)
}
