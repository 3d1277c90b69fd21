//! Generate a `JWT_SECRET` the server will accept.
//!
//! ```bash
//! gatehouse-cli secret generate >> .env
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use gatehouse_server::config::{self, ConfigError};
use rand::RngCore;
use secrecy::SecretString;

/// Default number of random bytes (64 characters once encoded).
pub const DEFAULT_BYTES: usize = 48;

/// Random bytes can spell a blocklisted word; retry a few times.
const MAX_ATTEMPTS: usize = 8;

/// Generate a URL-safe secret from `bytes` random bytes that passes the
/// server's strength check.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` if `bytes` is too small for the
/// encoded secret to pass.
pub fn generate(bytes: usize) -> Result<SecretString, ConfigError> {
    let mut last_err = None;

    for _ in 0..MAX_ATTEMPTS {
        let mut buf = vec![0u8; bytes];
        rand::rng().fill_bytes(&mut buf);
        let secret = SecretString::from(URL_SAFE_NO_PAD.encode(&buf));

        match config::check_secret(&secret, "JWT_SECRET") {
            Ok(()) => return Ok(secret),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        ConfigError::InsecureSecret("JWT_SECRET".to_owned(), "no secret generated".to_owned())
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_generated_secret_is_accepted() {
        let secret = generate(DEFAULT_BYTES).unwrap();
        assert_eq!(secret.expose_secret().len(), 64);
        assert!(config::check_secret(&secret, "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate(DEFAULT_BYTES).unwrap();
        let b = generate(DEFAULT_BYTES).unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn test_too_few_bytes_is_rejected() {
        assert!(matches!(generate(8), Err(ConfigError::InsecureSecret(_, _))));
    }
}
