//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GATEHOUSE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `GATEHOUSE_HOST` - Bind address (default: 127.0.0.1)
//! - `GATEHOUSE_PORT` - Listen port (default: 5000)
//! - `GATEHOUSE_TOKEN_TTL_DAYS` - Token lifetime in days (default: 90)
//! - `GATEHOUSE_UNIFORM_AUTH_ERRORS` - Report unknown emails as "Invalid credentials" and
//!   spend a bcrypt comparison on them (default: false)
//! - `GATEHOUSE_CORS_ORIGIN` - Single allowed browser origin (default: any)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 90;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origin, `None` allows any origin
    pub cors_origin: Option<String>,
    /// Token and password settings
    pub auth: AuthConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Token and password settings.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign and verify tokens
    pub jwt_secret: SecretString,
    /// Lifetime of issued tokens
    pub token_ttl: chrono::Duration,
    /// Collapse "User not found" into "Invalid credentials" on the wire and
    /// check unknown emails against a decoy hash
    pub uniform_errors: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("uniform_errors", &self.uniform_errors)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("GATEHOUSE_DATABASE_URL")?;
        let host = parse_env("GATEHOUSE_HOST", "127.0.0.1")?;
        let port = parse_env("GATEHOUSE_PORT", "5000")?;

        Ok(Self {
            database_url,
            host,
            port,
            cors_origin: get_optional_env("GATEHOUSE_CORS_ORIGIN"),
            auth: AuthConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    /// Load token settings from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `JWT_SECRET` is missing or weak, or if a
    /// numeric setting is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = get_validated_secret("JWT_SECRET")?;

        let ttl_days: i64 = parse_env(
            "GATEHOUSE_TOKEN_TTL_DAYS",
            &DEFAULT_TOKEN_TTL_DAYS.to_string(),
        )?;
        if ttl_days <= 0 {
            return Err(ConfigError::InvalidEnvVar(
                "GATEHOUSE_TOKEN_TTL_DAYS".to_string(),
                "must be positive".to_string(),
            ));
        }

        let uniform_errors = parse_env("GATEHOUSE_UNIFORM_AUTH_ERRORS", "false")?;

        Ok(Self {
            jwt_secret,
            token_ttl: chrono::Duration::days(ttl_days),
            uniform_errors,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a signing secret is long, not a placeholder, and random-looking.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use `gatehouse-cli secret generate`."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Check a secret produced outside the environment (e.g. by the CLI).
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` when the secret would be rejected
/// by [`ServerConfig::from_env`].
pub fn check_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    validate_secret_strength(secret.expose_secret(), var_name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy(STRONG) > 3.3);
    }

    #[test]
    fn test_secret_too_short() {
        let err = validate_secret_strength("aB3$xY9!", "JWT_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(err.to_string().contains("at least 32"));
    }

    #[test]
    fn test_secret_placeholder() {
        let err = validate_secret_strength("your-jwt-key-goes-here-0123456789AB", "JWT_SECRET")
            .unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_secret_low_entropy() {
        let err = validate_secret_strength(&"ab".repeat(20), "JWT_SECRET").unwrap_err();
        assert!(err.to_string().contains("entropy"));
    }

    #[test]
    fn test_secret_valid() {
        assert!(validate_secret_strength(STRONG, "JWT_SECRET").is_ok());
        assert!(check_secret(&SecretString::from(STRONG), "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/gatehouse"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            cors_origin: None,
            auth: AuthConfig {
                jwt_secret: SecretString::from(STRONG),
                token_ttl: chrono::Duration::days(DEFAULT_TOKEN_TTL_DAYS),
                uniform_errors: false,
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: SecretString::from(STRONG),
            token_ttl: chrono::Duration::days(90),
            uniform_errors: true,
        };

        let debug_output = format!("{auth:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("uniform_errors: true"));
        assert!(!debug_output.contains(STRONG));
    }
}
