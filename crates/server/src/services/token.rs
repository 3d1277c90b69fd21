//! Signed session tokens (HS256 JWT).
//!
//! Payload: `{ id, role, iat, exp }`. Tokens are write-once: there is no
//! refresh and no revocation, a token is valid until `exp`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatehouse_core::{Role, UserId};

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub id: UserId,
    /// Role at the time of issuance.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// A freshly minted token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Errors from minting or checking a token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("token lifetime overflows the calendar")]
    Overflow,
}

/// Mints and verifies tokens with a server-held secret.
///
/// Implements `Debug` manually so the keys never reach logs.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Mint a token for `user_id` valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Mint a token as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Overflow` if the expiry is not representable, or
    /// `TokenError::Signing` if encoding fails.
    pub fn issue_at(
        &self,
        user_id: UserId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::Overflow)?;

        let claims = Claims {
            id: user_id,
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        tracing::debug!(%user_id, %role, %expires_at, "Issued token");

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token's signature and expiry and return its payload.
    ///
    /// Expiry is checked with zero leeway.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` past `exp`, `TokenError::Invalid` for
    /// any other failure (bad signature, malformed token, wrong algorithm).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(
            &SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
            Duration::days(90),
        )
    }

    #[test]
    fn test_round_trip_recovers_id_and_role() {
        let signer = signer();
        let issued = signer.issue(UserId::new(42), Role::Admin).unwrap();

        let claims = signer.verify(&issued.token).unwrap();
        assert_eq!(claims.id, UserId::new(42));
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_expiry_is_ninety_days() {
        let signer = signer();
        let now = Utc::now();
        let issued = signer.issue_at(UserId::new(1), Role::Customer, now).unwrap();

        let claims = signer.verify(&issued.token).unwrap();
        assert_eq!(claims.exp - claims.iat, 90 * 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = signer();
        let long_ago = Utc::now() - Duration::days(91);
        let issued = signer
            .issue_at(UserId::new(1), Role::Customer, long_ago)
            .unwrap();

        assert!(matches!(
            signer.verify(&issued.token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = TokenSigner::new(
            &SecretString::from("Zq8#Lm3!Rt6@Wv1$Xy4%Bn7^Cd0&Fg2*"),
            Duration::days(90),
        );
        let issued = other.issue(UserId::new(1), Role::Admin).unwrap();

        assert!(matches!(
            signer().verify(&issued.token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            signer().verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", signer());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("aB3$"));
    }
}
