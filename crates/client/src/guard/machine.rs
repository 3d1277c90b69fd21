//! Guard state machine driven by session changes.

use tokio::sync::watch;

use super::{GuardState, Navigator, RouteGuard};
use crate::session::Session;

/// Drives a guard from session changes.
///
/// Starts in [`GuardState::Unknown`]. Each observation re-evaluates the guard;
/// the navigator is called only when the guard enters a redirect it was not
/// already in, so repeated observations of the same session are idempotent.
#[derive(Debug, Clone)]
pub struct GuardMachine<G> {
    guard: G,
    state: GuardState,
}

impl<G: RouteGuard> GuardMachine<G> {
    #[must_use]
    pub const fn new(guard: G) -> Self {
        Self {
            guard,
            state: GuardState::Unknown,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GuardState {
        &self.state
    }

    #[must_use]
    pub const fn guard(&self) -> &G {
        &self.guard
    }

    /// Mutable access to the guard, e.g. to change a role set. The next
    /// observation picks up the change.
    pub const fn guard_mut(&mut self) -> &mut G {
        &mut self.guard
    }

    /// Evaluate `session` and fire any new redirect through `navigator`.
    pub fn observe<N: Navigator + ?Sized>(
        &mut self,
        session: Option<&Session>,
        navigator: &mut N,
    ) -> &GuardState {
        let next = self.guard.evaluate(session);

        if let GuardState::Redirecting(redirect) = &next
            && self.state != next
        {
            tracing::debug!(
                to = redirect.to.path(),
                reason = ?redirect.reason,
                "Guard redirect"
            );
            navigator.navigate(redirect.to);
        }

        self.state = next;
        &self.state
    }

    /// `children` while authorized. Nothing in any other state, including
    /// before the first observation.
    #[must_use]
    pub fn render<'a, C: ?Sized>(&self, children: &'a C) -> Option<&'a C> {
        self.state.is_authorized().then_some(children)
    }

    /// Observe every session published on `sessions` until its sender is
    /// dropped.
    pub async fn follow<N: Navigator + ?Sized>(
        &mut self,
        mut sessions: watch::Receiver<Option<Session>>,
        navigator: &mut N,
    ) {
        loop {
            let session = sessions.borrow_and_update().clone();
            self.observe(session.as_ref(), navigator);

            if sessions.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use gatehouse_core::Role;

    use super::*;
    use crate::guard::{History, LandingGuard, Redirect, RedirectReason, RoleGuard, Route};
    use crate::session::tests::session_with_role;

    #[test]
    fn test_starts_unknown_and_renders_nothing() {
        let machine = GuardMachine::new(RoleGuard::new([Role::Admin]));
        assert_eq!(machine.state(), &GuardState::Unknown);
        assert_eq!(machine.render("admin panel"), None);
    }

    #[test]
    fn test_redirect_fires_once_per_transition() {
        let mut machine = GuardMachine::new(LandingGuard);
        let mut history = History::new();

        machine.observe(None, &mut history);
        machine.observe(None, &mut history);
        assert_eq!(history.entries(), &[Route::Login]);

        let admin = session_with_role("admin", Duration::days(1));
        machine.observe(Some(&admin), &mut history);
        assert_eq!(history.entries(), &[Route::Login, Route::AdminDashboard]);
        assert_eq!(
            machine.state(),
            &GuardState::Redirecting(Redirect::new(
                Route::AdminDashboard,
                RedirectReason::Landing(Role::Admin)
            ))
        );
    }

    #[test]
    fn test_authorized_does_not_navigate() {
        let mut machine = GuardMachine::new(RoleGuard::new([Role::Customer]));
        let mut history = History::new();
        let customer = session_with_role("customer", Duration::days(1));

        assert!(machine.observe(Some(&customer), &mut history).is_authorized());
        assert!(history.entries().is_empty());
        assert_eq!(machine.render("orders"), Some("orders"));
    }

    #[test]
    fn test_role_set_change_re_evaluates() {
        let mut machine = GuardMachine::new(RoleGuard::new([Role::Customer]));
        let mut history = History::new();
        let customer = session_with_role("customer", Duration::days(1));
        machine.observe(Some(&customer), &mut history);

        machine.guard_mut().set_allowed([Role::Admin]);
        machine.observe(Some(&customer), &mut history);
        assert_eq!(history.current(), Some(Route::Unauthorized));
        assert_eq!(machine.render("orders"), None);
    }

    #[tokio::test]
    async fn test_follow_tracks_session_until_closed() {
        let (tx, rx) = watch::channel(None);
        let customer = session_with_role("customer", Duration::days(1));

        let driver = tokio::spawn(async move {
            let mut machine = GuardMachine::new(RoleGuard::new([Role::Admin]));
            let mut history = History::new();
            machine.follow(rx, &mut history).await;
            (machine.state().clone(), history)
        });

        tx.send_replace(Some(customer));
        drop(tx);

        let (state, history) = driver.await.unwrap();
        assert_eq!(history.current(), Some(Route::Unauthorized));
        assert_eq!(
            state,
            GuardState::Redirecting(Redirect::new(
                Route::Unauthorized,
                RedirectReason::Unauthorized
            ))
        );
    }
}
