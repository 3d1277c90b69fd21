//! Gatehouse login server library.
//!
//! Exposes the credential store, token signer and HTTP router so the binary,
//! the CLI and the integration tests share one implementation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
