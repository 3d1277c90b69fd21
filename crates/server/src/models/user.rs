//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use gatehouse_core::{Email, Role, UserId, UserSummary};

/// A stored user account.
///
/// The password hash is not a field: it only leaves the store
/// alongside the user in `CredentialStore::find_by_email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: Option<String>,
    /// Login email, unique across users.
    pub email: Email,
    /// Postal address.
    pub address: Option<String>,
    /// Access role.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The subset of fields sent to clients.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary::new(self.id, self.name.clone(), self.email.clone(), self.role)
    }
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Email,
    /// bcrypt hash, never the plaintext password.
    pub password_hash: String,
    pub address: Option<String>,
    pub role: Role,
}
