use crate::http::ErrorInfo;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GitHub API error for {target}: {} ({})", .info.message, .info.code)]
    Api { target: String, info: ErrorInfo },
    #[error("fetch for {0} was cancelled")]
    Cancelled(String),
}

impl FetchError {
    pub fn code(&self) -> &str {
        match self {
            FetchError::Api { info, .. } => &info.code,
            FetchError::Cancelled(_) => "cancelled",
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no Chrome/Chromium executable found: {0}")]
    BrowserNotFound(String),
    #[error("browser exited with {status}: {stderr}")]
    Browser { status: String, stderr: String },
    #[error("render timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error(transparent)]
    Comments(#[from] FetchError),
    #[error("render cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token file {path} is unreadable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not build GitHub client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Browser(#[from] RenderError),
    #[error(transparent)]
    Listing(#[from] FetchError),
}
