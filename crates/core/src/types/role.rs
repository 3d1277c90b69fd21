//! User roles.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A role string that does not name a known [`Role`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("unrecognized role: {0:?}")]
    Unrecognized(String),
}

/// Access role of a user.
///
/// The set is closed: anything other than `admin` or `customer` fails to
/// parse with [`RoleError::Unrecognized`] instead of falling through to a
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Store administrator.
    Admin,
    /// Regular shopper. Assigned when no role is given.
    #[default]
    Customer,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            other => Err(RoleError::Unrecognized(other.to_owned())),
        }
    }
}
