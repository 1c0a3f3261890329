//! The observable session slot.
//!
//! DESIGN
//! ======
//! `SessionCell` wraps a `tokio::sync::watch` channel. Every mutation goes
//! through one `send_modify`/`send_if_modified` call, so token and user are
//! committed together and observers never see one without the other. The
//! API client reads the token from the same slot when it dispatches a
//! request, which keeps the `Authorization` header in lockstep with the
//! committed token.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;

use serde::Serialize;
use tokio::sync::watch;

use crate::net::api::TokenSource;
use crate::net::types::User;

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Bootstrap has not finished; `user` is not yet trustworthy.
    #[default]
    Initializing,
    /// Bootstrap finished. Never reverts.
    Ready,
}

/// Externally visible state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Initializing,
    Unauthenticated,
    Authenticated,
}

#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub status: SessionStatus,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .field("status", &self.status)
            .finish()
    }
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.status {
            SessionStatus::Initializing => SessionPhase::Initializing,
            SessionStatus::Ready if self.is_authenticated() => SessionPhase::Authenticated,
            SessionStatus::Ready => SessionPhase::Unauthenticated,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }
}

// =============================================================================
// CELL
// =============================================================================

pub struct SessionCell {
    tx: watch::Sender<Session>,
}

impl fmt::Debug for SessionCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCell").field(&*self.tx.borrow()).finish()
    }
}

impl SessionCell {
    /// A fresh `Initializing` session, seeded with a persisted token if one exists.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        let (tx, _rx) = watch::channel(Session { token, user: None, status: SessionStatus::Initializing });
        Self { tx }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.tx.borrow().status
    }

    /// Commit a new token and user together.
    pub fn authenticate(&self, token: String, user: User) {
        self.tx.send_modify(|session| {
            session.token = Some(token);
            session.user = Some(user);
        });
    }

    /// Replace the user wholesale while `token` is still the committed token.
    ///
    /// Returns `false` (and changes nothing) if the session was cleared or
    /// re-authenticated since `token` was read.
    pub fn replace_user(&self, token: &str, user: User) -> bool {
        self.tx.send_if_modified(|session| {
            if session.token.as_deref() != Some(token) {
                return false;
            }
            session.user = Some(user);
            true
        })
    }

    /// Drop token and user together. Returns whether anything was held.
    pub fn clear(&self) -> bool {
        self.tx.send_if_modified(|session| {
            let held = session.token.is_some() || session.user.is_some();
            session.token = None;
            session.user = None;
            held
        })
    }

    /// Like [`SessionCell::clear`], but only while `token` is still committed.
    pub fn clear_token(&self, token: &str) -> bool {
        self.tx.send_if_modified(|session| {
            if session.token.as_deref() != Some(token) {
                return false;
            }
            session.token = None;
            session.user = None;
            true
        })
    }

    /// Move to `Ready`. Returns `false` if already ready.
    pub fn mark_ready(&self) -> bool {
        self.tx.send_if_modified(|session| {
            if session.status == SessionStatus::Ready {
                return false;
            }
            session.status = SessionStatus::Ready;
            true
        })
    }
}

impl TokenSource for SessionCell {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}
