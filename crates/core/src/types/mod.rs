//! Domain types for Gatehouse.

pub mod email;
pub mod id;
pub mod role;

pub use email::{Email, EmailError};
pub use id::UserId;
pub use role::{Role, RoleError};
