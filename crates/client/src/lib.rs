//! Gatehouse client library.
//!
//! Holds the signed-in session and decides where navigation may go.
//!
//! - [`AuthContext`] owns the session, persists it through a
//!   [`SessionStorage`] and publishes every change on a `watch` channel.
//! - [`LandingGuard`] and [`RoleGuard`] turn a session into a
//!   [`GuardState`]; a [`GuardMachine`] follows the context and fires
//!   redirects through a [`Navigator`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod context;
pub mod error;
pub mod guard;
pub mod session;
pub mod storage;
pub mod transport;

pub use context::AuthContext;
pub use error::ClientError;
pub use guard::{
    GuardMachine, GuardState, History, LandingGuard, Navigator, Redirect, RedirectReason,
    RoleGuard, Route, RouteGuard,
};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use transport::{AuthTransport, HttpTransport};
