//! Error taxonomy for the session core.
//!
//! ERROR HANDLING
//! ==============
//! `ApiError` describes what went wrong on the wire. `SessionError` is what
//! callers of the session operations see: one variant per failing operation,
//! each carrying a human-readable message pulled from the server response
//! when one exists, and a generic fallback otherwise.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::path::PathBuf;

use serde::Deserialize;

pub const LOGIN_FAILED_MESSAGE: &str = "Failed to log in. Please check your credentials and try again.";
pub const REGISTER_FAILED_MESSAGE: &str = "Failed to register. Please try again.";
pub const PROFILE_UPDATE_FAILED_MESSAGE: &str = "Failed to update profile";
pub const PASSWORD_CHANGE_FAILED_MESSAGE: &str = "Failed to update password";

const USERNAME_TAKEN_SERVER: &str = "Username already taken";
const EMAIL_REGISTERED_SERVER: &str = "Email already registered";

// =============================================================================
// CONFIG / STORE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid number in {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token store I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token store at {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// API
// =============================================================================

/// Error payload shape returned by the API (`{"error": ..., "message": ...}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Parse an error body, treating anything that is not the expected JSON as empty.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// Transport failure or an undecodable response body.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server returned {status}{}", describe(.body))]
    Status { status: u16, body: ErrorBody },
    /// A request URL could not be built from the base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

fn describe(body: &ErrorBody) -> String {
    match (&body.error, &body.message) {
        (Some(error), Some(message)) => format!(": {error} ({message})"),
        (Some(text), None) | (None, Some(text)) => format!(": {text}"),
        (None, None) => String::new(),
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::ClientBuild(_) | Self::InvalidUrl(_) => None,
        }
    }

    #[must_use]
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Server `message`, else server `error`.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        let body = self.body()?;
        body.message.as_deref().or(body.error.as_deref())
    }

    /// Server `error`, else server `message`.
    #[must_use]
    pub fn server_error(&self) -> Option<&str> {
        let body = self.body()?;
        body.error.as_deref().or(body.message.as_deref())
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Distinguishable registration rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationErrorKind {
    UsernameTaken,
    EmailRegistered,
    Rejected,
}

impl RegistrationErrorKind {
    #[must_use]
    pub fn error_code(self) -> &'static str {
        match self {
            Self::UsernameTaken => "E_USERNAME_TAKEN",
            Self::EmailRegistered => "E_EMAIL_REGISTERED",
            Self::Rejected => "E_REGISTRATION",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Login rejected or failed; the session is cleared.
    #[error("{message}")]
    Authentication {
        message: String,
        #[source]
        source: ApiError,
    },
    /// Registration rejected; the session is unchanged.
    #[error("{message}")]
    Registration {
        kind: RegistrationErrorKind,
        message: String,
        #[source]
        source: ApiError,
    },
    /// Profile update rejected; the current user is unchanged.
    #[error("{message}")]
    ProfileUpdate {
        message: String,
        #[source]
        source: ApiError,
    },
    /// Password change rejected; the session is unchanged.
    #[error("{message}")]
    PasswordChange {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl SessionError {
    pub(crate) fn authentication(source: ApiError) -> Self {
        let message = source.server_message().unwrap_or(LOGIN_FAILED_MESSAGE).to_owned();
        Self::Authentication { message, source }
    }

    pub(crate) fn registration(source: ApiError) -> Self {
        let kind = match (source.status(), source.body().and_then(|b| b.error.as_deref())) {
            (Some(400), Some(USERNAME_TAKEN_SERVER)) => RegistrationErrorKind::UsernameTaken,
            (Some(400), Some(EMAIL_REGISTERED_SERVER)) => RegistrationErrorKind::EmailRegistered,
            _ => RegistrationErrorKind::Rejected,
        };
        let message = match kind {
            RegistrationErrorKind::UsernameTaken => "Username is already taken".to_owned(),
            RegistrationErrorKind::EmailRegistered => "Email is already registered".to_owned(),
            RegistrationErrorKind::Rejected => source.server_error().unwrap_or(REGISTER_FAILED_MESSAGE).to_owned(),
        };
        Self::Registration { kind, message, source }
    }

    pub(crate) fn profile_update(source: ApiError) -> Self {
        let message = source.server_message().unwrap_or(PROFILE_UPDATE_FAILED_MESSAGE).to_owned();
        Self::ProfileUpdate { message, source }
    }

    pub(crate) fn password_change(source: ApiError) -> Self {
        let message = source.server_message().unwrap_or(PASSWORD_CHANGE_FAILED_MESSAGE).to_owned();
        Self::PasswordChange { message, source }
    }

    /// Human-readable message suitable for direct display.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Authentication { message, .. }
            | Self::Registration { message, .. }
            | Self::ProfileUpdate { message, .. }
            | Self::PasswordChange { message, .. } => message,
        }
    }

    #[must_use]
    pub fn api_error(&self) -> &ApiError {
        match self {
            Self::Authentication { source, .. }
            | Self::Registration { source, .. }
            | Self::ProfileUpdate { source, .. }
            | Self::PasswordChange { source, .. } => source,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.api_error().status()
    }

    #[must_use]
    pub fn registration_kind(&self) -> Option<RegistrationErrorKind> {
        match self {
            Self::Registration { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Stable machine-readable code for UI branching.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "E_AUTHENTICATION",
            Self::Registration { kind, .. } => kind.error_code(),
            Self::ProfileUpdate { .. } => "E_PROFILE_UPDATE",
            Self::PasswordChange { .. } => "E_PASSWORD_CHANGE",
        }
    }
}
