//! Token persisted as a small JSON document on disk.

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::TokenStore;
use crate::error::StoreError;

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let file: TokenFile = serde_json::from_str(&contents)
            .map_err(|source| StoreError::Parse { path: self.path.clone(), source })?;
        Ok(Some(file.token).filter(|token| !token.is_empty()))
    }

    /// Writes `{"token": ...}` with mode 0600 on Unix.
    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = TokenFile { token: token.to_owned() };
        let contents = serde_json::to_string_pretty(&file)
            .map_err(|source| StoreError::Parse { path: self.path.clone(), source })?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut handle = options.open(&self.path).map_err(|e| self.io_error(e))?;
        handle.write_all(contents.as_bytes()).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}
