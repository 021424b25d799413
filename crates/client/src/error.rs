use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures talking to the CollectPro backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session expired, sign in again")]
    Unauthorized,
    #[error("permission denied")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Server(String),
    /// 2xx answer whose body says `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ClientError {
    /// The request never reached the server.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_connect() || err.is_timeout() || err.is_request())
            || matches!(self, Self::Auth(AuthError::Transport(_)))
    }
}

/// Failures from the auth provider and the user document store.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("this account has been disabled")]
    UserDisabled,
    #[error("too many attempts, try again later")]
    TooManyAttempts,
    #[error("not signed in")]
    SignedOut,
    #[error("session expired, sign in again")]
    TokenExpired,
    #[error("permission denied")]
    PermissionDenied,
    #[error("auth provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("printer not reachable at {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("printer write failed: {0}")]
    Write(#[source] io::Error),
    #[error("could not save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not run `{opener}`: {source}")]
    Open {
        opener: String,
        #[source]
        source: io::Error,
    },
}
