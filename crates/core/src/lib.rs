//! Gatehouse Core - Shared types library.
//!
//! Types shared by every Gatehouse component:
//! - `server` - Login endpoint and credential store
//! - `client` - Session context and route guards
//! - `cli` - Migrations, seeding, and a terminal login client
//!
//! The core crate holds types only: no I/O, no database access, no HTTP
//! clients. Database encoding for ids, emails, and roles is behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and emails, the [`Role`] enum
//! - [`api`] - JSON bodies exchanged by `POST /api/auth/login`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod types;

pub use api::{ErrorBody, LoginRequest, LoginSuccess, UserSummary};
pub use types::*;
