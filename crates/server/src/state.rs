//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::CredentialStore;
use crate::services::auth::Authenticator;
use crate::services::token::TokenSigner;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Requests share nothing mutable: the store
/// handles its own synchronization (connection pool or lock).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    auth: AuthConfig,
    authenticator: Authenticator,
}

impl AppState {
    /// Create application state over a credential store.
    #[must_use]
    pub fn new(auth: AuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        let signer = TokenSigner::new(&auth.jwt_secret, auth.token_ttl);
        let authenticator =
            Authenticator::new(store, signer).with_uniform_timing(auth.uniform_errors);

        Self {
            inner: Arc::new(AppStateInner {
                auth,
                authenticator,
            }),
        }
    }

    /// Token and password settings.
    #[must_use]
    pub fn auth_config(&self) -> &AuthConfig {
        &self.inner.auth
    }

    /// The login service.
    #[must_use]
    pub fn authenticator(&self) -> &Authenticator {
        &self.inner.authenticator
    }
}
