//! Authentication service.
//!
//! Verifies an email/password pair against the credential store and mints a
//! signed token on success. The only side effect is the store read: there
//! are no attempt counters and no audit records.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gatehouse_core::{Email, UserSummary};
use tokio::sync::OnceCell;

use crate::db::CredentialStore;
use crate::services::token::TokenSigner;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed token for the client to hold.
    pub token: String,
    /// When the token stops verifying.
    pub expires_at: DateTime<Utc>,
    /// Public view of the authenticated user.
    pub user: UserSummary,
}

/// bcrypt cost of the stand-in hash checked for unknown emails.
const DECOY_COST: u32 = 10;

/// Authentication service.
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    signer: TokenSigner,
    uniform_timing: bool,
    decoy_hash: OnceCell<String>,
}

impl Authenticator {
    /// Create a new authenticator over a store and a token signer.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, signer: TokenSigner) -> Self {
        Self {
            store,
            signer,
            uniform_timing: false,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Run a bcrypt comparison for unknown emails as well, so a miss costs
    /// about as much as a wrong password.
    #[must_use]
    pub fn with_uniform_timing(mut self, enabled: bool) -> Self {
        self.uniform_timing = enabled;
        self
    }

    /// The backing credential store.
    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// The token signer.
    #[must_use]
    pub const fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no user has exactly this email
    /// (including strings that are not email addresses at all).
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    /// Returns `AuthError::Repository`, `AuthError::Token`, or
    /// `AuthError::Task` if the lookup, signing, or hash task fails.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, AuthError> {
        // A malformed address cannot match a stored one
        let found = match Email::parse(email) {
            Ok(email) => self.store.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = found else {
            if self.uniform_timing {
                self.verify_against_decoy(password).await?;
            }
            return Err(AuthError::UserNotFound);
        };

        if !verify_password(password, password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.signer.issue(user.id, user.role)?;

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.summary(),
        })
    }

    async fn verify_against_decoy(&self, password: &str) -> Result<(), AuthError> {
        let hash = self
            .decoy_hash
            .get_or_try_init(|| hash_password("gatehouse-decoy", DECOY_COST))
            .await?;
        verify_password(password, hash.clone()).await?;
        Ok(())
    }
}

/// Hash a password with bcrypt at the given cost.
///
/// Runs on the blocking pool.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` for an out-of-range cost, or
/// `AuthError::Task` if the blocking task fails.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Compare a password with a stored bcrypt hash on the blocking pool.
///
/// An unparseable stored hash counts as a mismatch.
async fn verify_password(password: &str, hash: String) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;

    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash is unreadable");
        false
    }))
}
