//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const TOKEN_FILE_NAME: &str = "token.json";

const HOME_DIR_NAME: &str = ".freelance";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root every endpoint path is appended to (e.g. `http://localhost:5001/api`).
    pub base_url: String,
    /// Location of the persisted bearer token.
    pub token_path: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Config pointing at `base_url` with default timeouts and token location.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token_path: default_token_path(None, std::env::var("HOME").ok()),
            timeouts: Timeouts::default(),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `FREELANCE_BASE_URL`: default `http://localhost:5001/api`
    /// - `FREELANCE_TOKEN_FILE`: default `$FREELANCE_HOME/token.json`
    /// - `FREELANCE_HOME`: default `$HOME/.freelance`
    /// - `FREELANCE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FREELANCE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or a timeout is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or a timeout is not a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = lookup("FREELANCE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = parse_base_url(&base_url)?;

        let token_path = lookup("FREELANCE_TOKEN_FILE")
            .map_or_else(|| default_token_path(lookup("FREELANCE_HOME"), lookup("HOME")), PathBuf::from);

        let timeouts = Timeouts {
            request_secs: parse_secs(&lookup, "FREELANCE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "FREELANCE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { base_url, token_path, timeouts })
    }

    /// Override the base URL, validating it the same way the environment is.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is not http(s).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

fn parse_secs<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}

fn default_token_path(freelance_home: Option<String>, home: Option<String>) -> PathBuf {
    let dir = match (freelance_home, home) {
        (Some(dir), _) => PathBuf::from(dir),
        (None, Some(home)) => PathBuf::from(home).join(HOME_DIR_NAME),
        (None, None) => PathBuf::from(HOME_DIR_NAME),
    };
    dir.join(TOKEN_FILE_NAME)
}
