//! Command implementations.

pub mod migrate;
pub mod secret;
pub mod seed;
pub mod session;
pub mod user;

use secrecy::SecretString;

/// Connection string for the gatehouse database, with the same fallback the
/// server uses.
pub fn database_url() -> Option<SecretString> {
    std::env::var("GATEHOUSE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
