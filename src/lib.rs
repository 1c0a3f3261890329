//! Client-side session core for the Freelance Manager API.
//!
//! SYSTEM CONTEXT
//! ==============
//! The UI (or the `freelance` CLI) owns one [`SessionManager`] built at its
//! composition root. The manager owns the bearer token, the current user and
//! the bootstrap status, persists the token through a [`TokenStore`], and
//! hands out an [`ApiClient`] whose requests always carry the current token.

pub mod config;
pub mod error;
pub mod net;
pub mod services;
pub mod state;
pub mod store;

pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, RegistrationErrorKind, SessionError, StoreError};
pub use net::api::{ApiClient, TokenSource};
pub use net::types::{PasswordChange, ProfileUpdate, RegisterRequest, User};
pub use services::session::SessionManager;
pub use state::session::{Session, SessionPhase, SessionStatus};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
