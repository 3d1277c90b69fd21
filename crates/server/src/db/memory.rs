//! In-memory credential store.
//!
//! Behaves like [`PgUserStore`](super::PgUserStore) (exact-match lookups,
//! unique emails, sequential ids) without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use gatehouse_core::{Email, UserId};

use super::{CredentialStore, RepositoryError};
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    by_email: HashMap<Email, (User, String)>,
}

/// Credential store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_email.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self.inner.read().await.by_email.get(email).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_id += 1;
        let user = User {
            id: UserId::new(inner.next_id),
            name: new.name,
            email: new.email,
            address: new.address,
            role: new.role,
            created_at: Utc::now(),
        };
        inner
            .by_email
            .insert(user.email.clone(), (user.clone(), new.password_hash));
        Ok(user)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gatehouse_core::Role;

    use super::*;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: None,
            email: Email::parse(email).unwrap(),
            password_hash: "$2b$04$hash".to_owned(),
            address: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryUserStore::new();
        let first = store
            .create(new_user("a@x.io", Role::Admin))
            .await
            .unwrap();
        let second = store
            .create(new_user("b@x.io", Role::Customer))
            .await
            .unwrap();

        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store
            .create(new_user("a@x.io", Role::Admin))
            .await
            .unwrap();

        let err = store
            .create(new_user("a@x.io", Role::Customer))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let store = MemoryUserStore::new();
        store
            .create(new_user("a@x.io", Role::Admin))
            .await
            .unwrap();

        let found = store
            .find_by_email(&Email::parse("a@x.io").unwrap())
            .await
            .unwrap();
        let (user, hash) = found.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(hash, "$2b$04$hash");

        let missing = store
            .find_by_email(&Email::parse("A@x.io").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
