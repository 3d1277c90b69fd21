//! The session owner shared with the rest of the client.
//!
//! An [`AuthContext`] is created once at start-up with [`AuthContext::init`]
//! and handed to whatever needs the session. Readers take snapshots with
//! [`AuthContext::session`] or follow changes through
//! [`AuthContext::subscribe`]. Dropping the context (or calling
//! [`AuthContext::teardown`]) closes every subscription.

use chrono::{DateTime, Utc};
use gatehouse_core::{LoginRequest, UserSummary};
use tokio::sync::watch;

use crate::error::ClientError;
use crate::session::Session;
use crate::storage::SessionStorage;
use crate::transport::AuthTransport;

/// Owns the current session and publishes its changes.
pub struct AuthContext<T, S> {
    transport: T,
    storage: S,
    session: watch::Sender<Option<Session>>,
}

impl<T: AuthTransport, S: SessionStorage> AuthContext<T, S> {
    /// Create the context, restoring a persisted session if it is still valid.
    pub fn init(transport: T, storage: S) -> Self {
        Self::init_at(transport, storage, Utc::now())
    }

    /// [`init`](Self::init) with an explicit clock reading.
    ///
    /// An expired or unreadable persisted session is removed from storage.
    pub fn init_at(transport: T, mut storage: S, now: DateTime<Utc>) -> Self {
        let session = match storage.load() {
            Ok(Some(session)) if !session.is_expired(now) => {
                tracing::debug!(user_id = %session.user.id, "Restored session");
                Some(session)
            }
            Ok(Some(_)) => {
                tracing::info!("Stored session has expired, discarding");
                discard(&mut storage);
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Stored session is unreadable, discarding");
                discard(&mut storage);
                None
            }
        };

        let (session, _) = watch::channel(session);
        Self {
            transport,
            storage,
            session,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserSummary> {
        self.session.borrow().as_ref().map(|s| s.user.clone())
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Follow session changes.
    ///
    /// The receiver sees the current value first. Its `changed()` fails once
    /// the context is gone.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    /// Log in and, on success, store and publish the new session.
    ///
    /// On failure the current session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the transport error, `ClientError::MalformedToken` if the
    /// issued token cannot be read, or `ClientError::Storage` if the session
    /// cannot be persisted.
    pub async fn login(&mut self, request: &LoginRequest) -> Result<UserSummary, ClientError> {
        let success = self.transport.login(request).await?;
        let session = Session::from_login(success)?;
        self.storage.save(&session)?;

        let user = session.user.clone();
        tracing::info!(user_id = %user.id, role = %user.role, "Logged in");
        self.session.send_replace(Some(session));
        Ok(user)
    }

    /// Forget the session in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the stored copy cannot be removed.
    /// The in-memory session is cleared regardless.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        if self.session.send_replace(None).is_some() {
            tracing::info!("Logged out");
        }
        self.storage.clear()?;
        Ok(())
    }

    /// Log out if the token has expired by `now`. Returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the stored copy cannot be removed.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>) -> Result<bool, ClientError> {
        let stale = self
            .session
            .borrow()
            .as_ref()
            .is_some_and(|s| s.is_expired(now));

        if stale {
            tracing::info!("Session token expired");
            self.logout()?;
        }
        Ok(stale)
    }

    /// End the context. Subscribers observe the channel closing.
    pub fn teardown(self) {
        tracing::debug!(
            subscribers = self.session.receiver_count(),
            "Auth context torn down"
        );
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

fn discard<S: SessionStorage>(storage: &mut S) {
    if let Err(e) = storage.clear() {
        tracing::warn!(error = %e, "Failed to clear stored session");
    }
}
