use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// A `{ "token": "..." }` JSON file holding the GitHub token between runs.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no token has been stored yet.
    pub fn load(&self) -> Result<Option<String>, TokenError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TokenError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let stored: StoredToken =
            serde_json::from_str(&raw).map_err(|e| TokenError::Malformed {
                path: self.path.clone(),
                source: e,
            })?;
        let token = stored.token.trim().to_string();
        Ok(Some(token).filter(|t| !t.is_empty()))
    }

    pub fn save(&self, token: &str) -> Result<(), TokenError> {
        let io_err = |source| TokenError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(&StoredToken {
            token: token.to_string(),
        })
        .map_err(|e| TokenError::Malformed {
            path: self.path.clone(),
            source: e,
        })?;
        std::fs::write(&self.path, body).map_err(io_err)
    }
}
