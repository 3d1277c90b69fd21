//! Business logic services.

pub mod auth;
pub mod token;

pub use auth::{AuthError, Authenticator, LoginOutcome};
pub use token::{Claims, TokenError, TokenSigner};
