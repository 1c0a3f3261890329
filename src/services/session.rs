//! Session manager: the single source of truth for who is logged in.
//!
//! SYSTEM CONTEXT
//! ==============
//! Built once at the composition root and shared by handle. It owns the
//! [`SessionCell`], the persisted [`TokenStore`], and an [`ApiClient`] whose
//! bearer header is read from the cell at dispatch time.
//!
//! DESIGN
//! ======
//! Every token mutation commits token and user in one step on the cell and
//! mirrors the token into the store while holding `persist`, so the
//! in-memory and persisted tokens always move together. Results that arrive
//! after the session moved on (bootstrap, refresh, profile update) are only
//! adopted while the token they were issued for is still committed.
//!
//! ERROR HANDLING
//! ==============
//! Login, registration, profile and password failures return a
//! [`SessionError`]. Logout and bootstrap never fail: server and store
//! errors are logged and local state is cleaned up regardless.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, SessionError};
use crate::net::api::ApiClient;
use crate::net::types::{
    AuthResponse, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest, User, UserEnvelope,
};
use crate::state::session::{Session, SessionCell, SessionStatus};
use crate::store::TokenStore;

pub(crate) const LOGIN_PATH: &str = "/auth/login";
pub(crate) const REGISTER_PATH: &str = "/auth/register";
pub(crate) const LOGOUT_PATH: &str = "/auth/logout";
pub(crate) const USER_PATH: &str = "/auth/user";
pub(crate) const PASSWORD_PATH: &str = "/auth/user/password";

pub struct SessionManager {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
    state: Arc<SessionCell>,
    bootstrap: OnceCell<()>,
    /// Serializes a cell mutation with its store write.
    persist: Mutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.api)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Build a manager seeded with whatever token `store` holds.
    ///
    /// The session starts `Initializing`; call [`SessionManager::bootstrap`]
    /// before trusting `current_user`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let persisted = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "session: token store unreadable; starting without a token");
            None
        });
        let state = Arc::new(SessionCell::new(persisted));
        let api = ApiClient::new(config, state.clone())?;
        Ok(Self { api, store, state, bootstrap: OnceCell::new(), persist: Mutex::new(()) })
    }

    /// Client whose requests carry the current session's bearer token.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.snapshot()
    }

    /// Observe every committed session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.token()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.user()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Restore the session from the persisted token and mark it `Ready`.
    ///
    /// The restore runs once per manager; concurrent and later callers wait
    /// for that one attempt and get the resulting snapshot.
    pub async fn bootstrap(&self) -> Session {
        self.bootstrap.get_or_init(|| self.restore()).await;
        self.snapshot()
    }

    async fn restore(&self) {
        match self.state.token() {
            None => debug!("session: no persisted token"),
            Some(token) => match self.api.get::<User>(USER_PATH).await {
                Ok(user) => {
                    let username = user.username.clone();
                    if self.state.replace_user(&token, user) {
                        debug!(%username, "session: restored from persisted token");
                    }
                }
                Err(e) => {
                    warn!(error = %e, status = ?e.status(), "session: persisted token rejected");
                    self.clear_if_current(&token);
                }
            },
        }
        self.state.mark_ready();
    }

    // =========================================================================
    // LOGIN / REGISTER / LOGOUT
    // =========================================================================

    /// Clear any existing session, then authenticate.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Authentication`]; the session is left cleared.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        self.logout().await;

        let request = LoginRequest { username, password };
        match self.api.post::<AuthResponse, _>(LOGIN_PATH, &request).await {
            Ok(auth) => {
                let user = self.commit(auth);
                info!(username = %user.username, "session: logged in");
                Ok(user)
            }
            Err(e) => {
                warn!(%username, status = ?e.status(), "session: login failed");
                Err(SessionError::authentication(e))
            }
        }
    }

    /// Create an account and adopt its session. Any existing session is overwritten on success.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Registration`]; the session is left unchanged.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, SessionError> {
        match self.api.post::<AuthResponse, _>(REGISTER_PATH, request).await {
            Ok(auth) => {
                let user = self.commit(auth);
                info!(username = %user.username, "session: registered");
                Ok(user)
            }
            Err(e) => {
                let err = SessionError::registration(e);
                warn!(username = %request.username, code = err.error_code(), "session: registration failed");
                Err(err)
            }
        }
    }

    /// Best-effort server logout, then unconditional local cleanup.
    pub async fn logout(&self) {
        if let Err(e) = self.api.post_empty(LOGOUT_PATH).await {
            warn!(error = %e, status = ?e.status(), "session: server logout failed; clearing locally");
        }
        self.clear_all();
        info!("session: logged out");
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    /// Send a profile update and replace the current user with the server's copy.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ProfileUpdate`]; the current user is left unchanged.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, SessionError> {
        let token = self.state.token();
        let envelope = self
            .api
            .put::<UserEnvelope, _>(USER_PATH, update)
            .await
            .map_err(SessionError::profile_update)?;

        let user = envelope.user;
        if let Some(token) = token {
            if !self.state.replace_user(&token, user.clone()) {
                debug!("session: profile updated after session changed; not adopted");
            }
        }
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns [`SessionError::PasswordChange`]. The session is never modified.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<(), SessionError> {
        let body = PasswordChange {
            current_password: current_password.to_owned(),
            new_password: new_password.to_owned(),
        };
        self.api
            .put_empty(PASSWORD_PATH, &body)
            .await
            .map_err(SessionError::password_change)?;
        info!("session: password changed");
        Ok(())
    }

    /// Re-check the held token against the server.
    ///
    /// Returns the fresh user, or `None` when no token is held or the check
    /// failed (in which case the session has been cleared).
    pub async fn refresh(&self) -> Option<User> {
        let token = self.state.token()?;
        match self.api.get::<User>(USER_PATH).await {
            Ok(user) => {
                if self.state.replace_user(&token, user.clone()) {
                    Some(user)
                } else {
                    self.state.user()
                }
            }
            Err(e) => {
                warn!(error = %e, status = ?e.status(), "session: token re-check failed");
                self.clear_if_current(&token);
                None
            }
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn commit(&self, auth: AuthResponse) -> User {
        let AuthResponse { token, user } = auth;
        let _guard = self.persist.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.store.save(&token) {
            warn!(error = %e, "session: failed to persist token");
        }
        self.state.authenticate(token, user.clone());
        user
    }

    fn clear_all(&self) {
        let _guard = self.persist.lock().unwrap_or_else(PoisonError::into_inner);
        self.state.clear();
        self.clear_store();
    }

    fn clear_if_current(&self, token: &str) {
        let _guard = self.persist.lock().unwrap_or_else(PoisonError::into_inner);
        if self.state.clear_token(token) {
            self.clear_store();
        }
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "session: failed to clear persisted token");
        }
    }
}
