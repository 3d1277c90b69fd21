//! Seed the user table.
//!
//! Without a file, seeds the default administrator account. With `--file`,
//! reads a YAML list of users:
//!
//! ```yaml
//! users:
//!   - email: admin@gmail.com
//!     password: admin
//!     name: admin
//!     address: admin address
//!     role: admin
//!   - email: customer1@gmail.com
//!     password: customer1
//! ```
//!
//! Users whose email already exists are skipped, so seeding is safe to
//! repeat.

use std::path::Path;

use gatehouse_core::{Email, Role};
use gatehouse_server::db::{self, CredentialStore, PgUserStore};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{error, info};

use super::user::{self, UserError, UserSpec};

/// Seed file layout.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl From<SeedUser> for UserSpec {
    fn from(u: SeedUser) -> Self {
        Self {
            email: u.email,
            password: u.password,
            name: u.name,
            address: u.address,
            role: u.role,
        }
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
    pub errors: Vec<(String, UserError)>,
}

/// The account seeded when no file is given.
#[must_use]
pub fn default_users() -> Vec<SeedUser> {
    vec![SeedUser {
        email: "admin@gmail.com".to_owned(),
        password: "admin".to_owned(),
        name: Some("admin".to_owned()),
        address: Some("admin address".to_owned()),
        role: Role::Admin,
    }]
}

/// Check every entry before touching the database.
///
/// Returns one message per problem; empty means valid.
#[must_use]
pub fn validate(users: &[SeedUser]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for (i, u) in users.iter().enumerate() {
        if let Err(e) = Email::parse(&u.email) {
            errors.push(format!("users[{i}]: invalid email {:?}: {e}", u.email));
        } else if !seen.insert(u.email.as_str()) {
            errors.push(format!("users[{i}]: duplicate email {}", u.email));
        }
        if u.password.is_empty() {
            errors.push(format!("users[{i}]: empty password"));
        }
    }
    errors
}

/// Insert `users` into `store`, skipping emails that already exist.
pub async fn seed_users(
    store: &dyn CredentialStore,
    users: Vec<SeedUser>,
    cost: u32,
) -> SeedReport {
    let mut report = SeedReport::default();

    for u in users {
        let email = u.email.clone();
        match user::insert(store, u.into(), cost).await {
            Ok(created) => {
                info!(
                    id = %created.id,
                    email = %created.email,
                    role = %created.role,
                    "Inserted user"
                );
                report.inserted += 1;
            }
            Err(UserError::UserExists(_)) => {
                info!(%email, "User already exists, skipping");
                report.skipped += 1;
            }
            Err(e) => report.errors.push((email, e)),
        }
    }
    report
}

/// Seed users from `file_path`, or the default admin when `None`.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot be
/// read or fails validation, or the database is unreachable.
pub async fn run(file_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url: SecretString =
        super::database_url().ok_or("GATEHOUSE_DATABASE_URL not set")?;
    let cost = user::bcrypt_cost()?;

    let users = match file_path {
        Some(path) => {
            if !path.exists() {
                return Err(format!("File not found: {}", path.display()).into());
            }
            info!(path = %path.display(), "Loading users from file");
            let content = tokio::fs::read_to_string(path).await?;
            serde_yaml::from_str::<SeedFile>(&content)?.users
        }
        None => default_users(),
    };

    info!(users = users.len(), "Parsed seed data");

    let errors = validate(&users);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let store = PgUserStore::new(db::create_pool(&database_url).await?);
    info!("Connected to database");

    let report = seed_users(&store, users, cost).await;

    info!("Seeding complete!");
    info!("  Users inserted: {}", report.inserted);
    info!("  Users skipped (already exist): {}", report.skipped);

    if !report.errors.is_empty() {
        error!("  Errors: {}", report.errors.len());
        for (email, err) in &report.errors {
            error!("    - {email}: {err}");
        }
        return Err(format!("{} users failed to seed", report.errors.len()).into());
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gatehouse_server::db::MemoryUserStore;

    use super::*;

    const YAML: &str = "
users:
  - email: admin@gmail.com
    password: admin
    name: admin
    address: admin address
    role: admin
  - email: customer1@gmail.com
    password: customer1
";

    #[test]
    fn test_parse_seed_file() {
        let file: SeedFile = serde_yaml::from_str(YAML).unwrap();
        assert_eq!(file.users.len(), 2);
        assert_eq!(file.users[0].role, Role::Admin);
        assert_eq!(file.users[1].role, Role::Customer);
        assert!(file.users[1].name.is_none());
    }

    #[test]
    fn test_unknown_role_fails_to_parse() {
        let yaml = "users:\n  - email: m@gmail.com\n    password: m\n    role: manager\n";
        assert!(serde_yaml::from_str::<SeedFile>(yaml).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(validate(&default_users()).is_empty());

        let mut users = default_users();
        users.extend(default_users());
        users.push(SeedUser {
            email: "nobody".to_owned(),
            password: String::new(),
            name: None,
            address: None,
            role: Role::Customer,
        });

        let errors = validate(&users);
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].contains("duplicate"));
    }

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let store = MemoryUserStore::new();
        let file: SeedFile = serde_yaml::from_str(YAML).unwrap();

        let first = seed_users(&store, file.users.clone(), 4).await;
        assert_eq!((first.inserted, first.skipped), (2, 0));
        assert!(first.errors.is_empty());

        let again = seed_users(&store, file.users, 4).await;
        assert_eq!((again.inserted, again.skipped), (0, 2));
        assert_eq!(store.len().await, 2);
    }
}
