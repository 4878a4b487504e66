//! Domain error types.
//!
//! Each component reports failures through its own enum; the API layer maps
//! them onto HTTP responses in [`crate::error`].

use std::time::Duration;

/// Failure to retrieve or parse the upstream feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed request timed out after {0:?}")]
    Timeout(Duration),

    #[error("feed request failed: {0}")]
    Request(String),

    #[error("feed server responded with status {0}")]
    Status(u16),

    #[error("feed document could not be parsed: {0}")]
    Parse(String),
}

/// Failure inside the subscriber record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no subscriber records exist yet")]
    NoRecords,

    #[error("record file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record store writer is not running")]
    Unavailable,
}

/// Failure of a subscribe request.
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rejection by the admin gate.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("too many attempts; retry in {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("invalid credentials")]
    InvalidCredentials,
}
