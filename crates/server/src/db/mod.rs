//! Credential store.
//!
//! # Database: `gatehouse`
//!
//! ## Tables
//!
//! - `users` - Login accounts (unique email, bcrypt hash, role)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p gatehouse-cli -- migrate
//! ```
//!
//! The [`CredentialStore`] trait is the seam between the authenticator and
//! storage. [`PgUserStore`] backs the server binary; [`MemoryUserStore`]
//! backs tests and local runs without a database.

pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use gatehouse_core::Email;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::user::{NewUser, User};

pub use memory::MemoryUserStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persisted collection of user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the user with exactly this email, together with their password hash.
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<(User, String)>, RepositoryError>;

    /// Insert a new user.
    ///
    /// Fails with `RepositoryError::Conflict` if the email is already taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
