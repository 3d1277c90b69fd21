//! Route guards.
//!
//! A guard looks at the current session and answers with a [`GuardState`]:
//! either the navigation may proceed ([`GuardState::Authorized`]) or it must
//! be redirected ([`GuardState::Redirecting`]). A missing session or a role
//! that is not allowed is a redirect, never an error.
//!
//! ```text
//!              session changes
//!   Unknown ──────────────────────▶ Redirecting(Redirect)
//!      │                                 ▲
//!      └────────────▶ Authorized ◀───────┘
//! ```

mod machine;
mod navigator;

pub use machine::GuardMachine;
pub use navigator::{History, Navigator};

use core::fmt;

use gatehouse_core::Role;

use crate::session::Session;

/// Client-side destinations a guard can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    AdminDashboard,
    CustomerDashboard,
    Unauthorized,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::AdminDashboard => "/admin/dashboard",
            Self::CustomerDashboard => "/customer/dashboard",
            Self::Unauthorized => "/unauthorized",
        }
    }

    /// Where a user with `role` lands after signing in.
    #[must_use]
    pub const fn landing(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminDashboard,
            Role::Customer => Self::CustomerDashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Why a guard redirected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectReason {
    /// No session.
    Unauthenticated,
    /// Signed in, but the role is not in the allowed set.
    Unauthorized,
    /// The session carries a role this client does not know.
    UnrecognizedRole(String),
    /// Sent to the landing page for this role.
    Landing(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub reason: RedirectReason,
}

impl Redirect {
    #[must_use]
    pub const fn new(to: Route, reason: RedirectReason) -> Self {
        Self { to, reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    /// No session has been evaluated yet. Nothing is rendered.
    #[default]
    Unknown,
    Redirecting(Redirect),
    Authorized,
}

impl GuardState {
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }

    #[must_use]
    pub const fn redirect(&self) -> Option<&Redirect> {
        match self {
            Self::Redirecting(redirect) => Some(redirect),
            _ => None,
        }
    }
}

/// Decide whether navigation is permitted for a session.
pub trait RouteGuard {
    fn evaluate(&self, session: Option<&Session>) -> GuardState;
}

/// Sends every visitor somewhere else: signed-out users to the login page,
/// signed-in users to their role's dashboard. Never renders anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandingGuard;

impl RouteGuard for LandingGuard {
    fn evaluate(&self, session: Option<&Session>) -> GuardState {
        let Some(session) = session else {
            return GuardState::Redirecting(Redirect::new(
                Route::Login,
                RedirectReason::Unauthenticated,
            ));
        };

        let redirect = match session.role() {
            Ok(role) => Redirect::new(Route::landing(role), RedirectReason::Landing(role)),
            Err(_) => Redirect::new(
                Route::Login,
                RedirectReason::UnrecognizedRole(session.user.role.clone()),
            ),
        };
        GuardState::Redirecting(redirect)
    }
}

/// Lets through sessions whose role is in `allowed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    allowed: Vec<Role>,
}

impl RoleGuard {
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }

    /// Replace the allowed set. Callers re-evaluate afterwards.
    pub fn set_allowed(&mut self, allowed: impl IntoIterator<Item = Role>) {
        self.allowed = allowed.into_iter().collect();
    }

    /// `children` when the session passes, nothing otherwise.
    #[must_use]
    pub fn render<'a, C: ?Sized>(
        &self,
        session: Option<&Session>,
        children: &'a C,
    ) -> Option<&'a C> {
        self.evaluate(session).is_authorized().then_some(children)
    }
}

impl RouteGuard for RoleGuard {
    fn evaluate(&self, session: Option<&Session>) -> GuardState {
        let Some(session) = session else {
            return GuardState::Redirecting(Redirect::new(
                Route::Login,
                RedirectReason::Unauthenticated,
            ));
        };

        match session.role() {
            Ok(role) if self.allowed.contains(&role) => GuardState::Authorized,
            Ok(_) => GuardState::Redirecting(Redirect::new(
                Route::Unauthorized,
                RedirectReason::Unauthorized,
            )),
            Err(_) => GuardState::Redirecting(Redirect::new(
                Route::Unauthorized,
                RedirectReason::UnrecognizedRole(session.user.role.clone()),
            )),
        }
    }
}
