//! Integration tests for Gatehouse.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process server and client (no external services)
//! cargo test -p gatehouse-integration-tests
//!
//! # Include the PostgreSQL store tests
//! GATEHOUSE_DATABASE_URL=postgres://... cargo test -p gatehouse-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `login_flow` - Real HTTP between the client library and an in-process server
//! - `postgres_store` - `PgUserStore` against a live database

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use gatehouse_core::{Email, EmailError, Role};
use gatehouse_server::config::AuthConfig;
use gatehouse_server::db::{CredentialStore, MemoryUserStore, RepositoryError};
use gatehouse_server::models::user::NewUser;
use gatehouse_server::routes;
use gatehouse_server::services::auth::{self, AuthError};
use gatehouse_server::state::AppState;
use secrecy::SecretString;
use thiserror::Error;
use tokio::task::JoinHandle;
use url::Url;

/// Signing secret used by every test server.
pub const TEST_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

/// Accounts present in every test server: `(email, password, role)`.
pub const SEEDED_USERS: &[(&str, &str, Role)] = &[
    ("admin@gmail.com", "admin", Role::Admin),
    ("customer1@gmail.com", "customer1", Role::Customer),
];

/// Errors while preparing a test server.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("seeding failed: {0}")]
    Seed(#[from] AuthError),

    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    #[error("invalid seed email: {0}")]
    Email(#[from] EmailError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: {0}")]
    Cors(#[from] axum::http::header::InvalidHeaderValue),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Auth settings for tests: fixed secret, default token lifetime.
#[must_use]
pub fn test_auth_config(uniform_errors: bool) -> AuthConfig {
    AuthConfig {
        jwt_secret: SecretString::from(TEST_SECRET),
        token_ttl: chrono::Duration::days(90),
        uniform_errors,
    }
}

/// A memory store holding [`SEEDED_USERS`].
///
/// # Errors
///
/// Returns `SetupError` if hashing or inserting a user fails.
pub async fn seeded_store() -> Result<MemoryUserStore, SetupError> {
    let store = MemoryUserStore::new();
    for &(email, password, role) in SEEDED_USERS {
        let name = email.split('@').next().map(str::to_owned);
        store
            .create(NewUser {
                name,
                email: Email::parse(email)?,
                password_hash: auth::hash_password(password, 4).await?,
                address: None,
                role,
            })
            .await?;
    }
    Ok(store)
}

/// A gatehouse server listening on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over [`seeded_store`].
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if seeding or binding fails.
    pub async fn start(uniform_errors: bool) -> Result<Self, SetupError> {
        let store = seeded_store().await?;
        let state = AppState::new(test_auth_config(uniform_errors), Arc::new(store));
        let app = routes::app(state.clone(), routes::cors_layer(None)?);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Base URL for client transports.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::Url` if the address does not form a URL.
    pub fn base_url(&self) -> Result<Url, SetupError> {
        Ok(Url::parse(&format!("http://{}", self.addr))?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
