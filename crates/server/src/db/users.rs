//! `PostgreSQL` user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gatehouse_core::{Email, Role, UserId};

use super::{CredentialStore, RepositoryError};
use crate::models::user::{NewUser, User};

/// Row shape shared by every `users` query.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: Option<String>,
    email: String,
    password_hash: String,
    address: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_parts(self) -> Result<(User, String), RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let user = User {
            id: self.id,
            name: self.name,
            email,
            address: self.address,
            role: self.role,
            created_at: self.created_at,
        };
        Ok((user, self.password_hash))
    }
}

/// Credential store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgUserStore {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, password_hash, address, role, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_parts).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, password_hash, address, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, address, role, created_at
            ",
        )
        .bind(user.name)
        .bind(user.email.as_str())
        .bind(user.password_hash)
        .bind(user.address)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let (user, _) = row.into_parts()?;
        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
