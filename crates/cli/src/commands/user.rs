//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! gatehouse-cli user create -e admin@example.com -p 'pass' -n "Admin Name" -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `GATEHOUSE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `GATEHOUSE_BCRYPT_COST` - bcrypt cost for the new hash (default: 10)

use gatehouse_core::{Email, Role};
use gatehouse_server::config::ConfigError;
use gatehouse_server::db::{self, CredentialStore, PgUserStore, RepositoryError};
use gatehouse_server::models::user::{NewUser, User};
use gatehouse_server::services::auth::{self, AuthError};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("User already exists with email: {0}")]
    UserExists(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),
}

/// Fields for a user to create, before hashing.
#[derive(Debug, Clone)]
pub struct UserSpec {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt cost from `GATEHOUSE_BCRYPT_COST`, or the default.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the variable is set but out of range.
pub fn bcrypt_cost() -> Result<u32, ConfigError> {
    std::env::var("GATEHOUSE_BCRYPT_COST")
        .map_or(Ok(DEFAULT_BCRYPT_COST), |v| parse_bcrypt_cost(&v))
}

/// Parse a bcrypt cost, which the algorithm limits to 4..=31.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if `value` is not a number in range.
pub fn parse_bcrypt_cost(value: &str) -> Result<u32, ConfigError> {
    let cost = value.parse::<u32>().map_err(|e| {
        ConfigError::InvalidEnvVar("GATEHOUSE_BCRYPT_COST".to_owned(), e.to_string())
    })?;
    if !(4..=31).contains(&cost) {
        return Err(ConfigError::InvalidEnvVar(
            "GATEHOUSE_BCRYPT_COST".to_owned(),
            format!("must be between 4 and 31 (got {cost})"),
        ));
    }
    Ok(cost)
}

/// Hash the password and insert the user into `store`.
///
/// # Errors
///
/// Returns `UserError` if the email is malformed, the password is empty, the
/// email is taken, or the store fails.
pub async fn insert(
    store: &dyn CredentialStore,
    spec: UserSpec,
    cost: u32,
) -> Result<User, UserError> {
    let email =
        Email::parse(&spec.email).map_err(|_| UserError::InvalidEmail(spec.email.clone()))?;
    if spec.password.is_empty() {
        return Err(UserError::EmptyPassword);
    }

    let password_hash = auth::hash_password(&spec.password, cost).await?;

    store
        .create(NewUser {
            name: spec.name,
            email,
            password_hash,
            address: spec.address,
            role: spec.role,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(spec.email),
            other => other.into(),
        })
}

/// Create a single user in the configured database.
///
/// # Returns
///
/// The created user.
///
/// # Errors
///
/// Returns `UserError` if configuration is missing or invalid, or the insert
/// fails.
pub async fn create(spec: UserSpec) -> Result<User, UserError> {
    dotenvy::dotenv().ok();

    let cost = bcrypt_cost()?;
    let database_url =
        super::database_url().ok_or(UserError::MissingEnvVar("GATEHOUSE_DATABASE_URL"))?;

    tracing::info!("Connecting to gatehouse database...");
    let store = PgUserStore::new(db::create_pool(&database_url).await?);

    tracing::info!("Creating user: {} ({})", spec.email, spec.role);
    let user = insert(&store, spec, cost).await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gatehouse_server::db::MemoryUserStore;

    use super::*;

    fn spec(email: &str, password: &str) -> UserSpec {
        UserSpec {
            email: email.to_owned(),
            password: password.to_owned(),
            name: None,
            address: None,
            role: Role::Customer,
        }
    }

    #[test]
    fn test_bcrypt_cost_range() {
        assert_eq!(parse_bcrypt_cost("10").unwrap(), 10);
        assert_eq!(parse_bcrypt_cost("4").unwrap(), 4);
        assert!(parse_bcrypt_cost("3").is_err());
        assert!(parse_bcrypt_cost("32").is_err());
        assert!(parse_bcrypt_cost("ten").is_err());
    }

    #[tokio::test]
    async fn test_insert_hashes_password() {
        let store = MemoryUserStore::new();
        let user = insert(&store, spec("customer1@gmail.com", "customer1"), 4)
            .await
            .unwrap();

        let (found, hash) = store.find_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Customer);
        assert_ne!(hash, "customer1");
        assert!(hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_user_exists() {
        let store = MemoryUserStore::new();
        insert(&store, spec("customer1@gmail.com", "customer1"), 4)
            .await
            .unwrap();

        let err = insert(&store, spec("customer1@gmail.com", "other"), 4)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::UserExists(_)));
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_input() {
        let store = MemoryUserStore::new();

        let err = insert(&store, spec("not-an-email", "pw"), 4).await.unwrap_err();
        assert!(matches!(err, UserError::InvalidEmail(_)));

        let err = insert(&store, spec("a@b.com", ""), 4).await.unwrap_err();
        assert!(matches!(err, UserError::EmptyPassword));
        assert!(store.is_empty().await);
    }
}
