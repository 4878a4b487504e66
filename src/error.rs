//! HTTP-facing error type.
//!
//! Every handler returns [`AppError`] on failure. Domain errors convert into it
//! through the `From` impls below, which decide what the client is allowed to
//! see: input problems are reported verbatim, upstream and storage causes are
//! replaced by generic messages.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::errors::{AuthError, FeedError, StoreError, SubscribeError};

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const INVALID_BODY: &str = "Invalid request body";
pub const BODY_TOO_LARGE: &str = "Request body too large";
pub const INVALID_PASSWORD: &str = "Invalid password";
pub const TOO_MANY_ATTEMPTS: &str = "Too many attempts, please try again later";
pub const NO_RECORDS: &str = "No emails collected yet";
pub const FEED_UNAVAILABLE: &str = "Failed to fetch RSS feed";
pub const INTERNAL: &str = "Internal server error";

/// JSON body shared by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 400: user-correctable input problem.
    #[error("{message}")]
    Validation { message: String },

    /// 401: bad credentials.
    #[error("{message}")]
    Unauthorized { message: String },

    /// 429: attempt budget exhausted.
    #[error("{message}")]
    TooManyRequests {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// 413: body over the configured limit.
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// 404: missing resource.
    #[error("{message}")]
    NotFound { message: String },

    /// 500: upstream dependency failed.
    #[error("{message}")]
    Upstream { message: String },

    /// 500: anything else.
    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn too_many_requests(message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Self::TooManyRequests {
            message: message.into(),
            retry_after_secs,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let retry_after = match &self {
            AppError::TooManyRequests {
                retry_after_secs: Some(secs),
                ..
            } => Some(*secs),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
        };

        let mut response = (status, Json(body)).into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge {
                message: BODY_TOO_LARGE.to_string(),
            };
        }
        AppError::bad_request(INVALID_BODY)
    }
}

impl From<FeedError> for AppError {
    fn from(_: FeedError) -> Self {
        AppError::upstream(FEED_UNAVAILABLE)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NoRecords => AppError::not_found(NO_RECORDS),
            StoreError::Io(_) | StoreError::Unavailable => AppError::internal(INTERNAL),
        }
    }
}

impl From<SubscribeError> for AppError {
    fn from(e: SubscribeError) -> Self {
        match e {
            SubscribeError::InvalidEmail => AppError::bad_request(INVALID_EMAIL),
            SubscribeError::Store(inner) => inner.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::RateLimited { retry_after } => {
                // Round up so clients never retry a second early.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                AppError::too_many_requests(TOO_MANY_ATTEMPTS, Some(secs))
            }
            AuthError::InvalidCredentials => AppError::unauthorized(INVALID_PASSWORD),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_feed_error_hides_cause() {
        let err: AppError = FeedError::Request("dns error: secret-host".to_string()).into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), FEED_UNAVAILABLE);
    }

    #[test]
    fn test_store_errors() {
        let not_found: AppError = StoreError::NoRecords.into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let io: AppError = StoreError::Io(std::io::Error::other("disk full")).into();
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.to_string(), INTERNAL);
    }

    #[test]
    fn test_auth_errors() {
        let limited: AppError = AuthError::RateLimited {
            retry_after: Duration::from_millis(1500),
        }
        .into();
        assert!(matches!(
            limited,
            AppError::TooManyRequests {
                retry_after_secs: Some(2),
                ..
            }
        ));

        let denied: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(denied.to_string(), INVALID_PASSWORD);
    }

    #[test]
    fn test_retry_after_header() {
        let response = AppError::too_many_requests(TOO_MANY_ATTEMPTS, Some(42)).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_invalid_email_message() {
        let err: AppError = SubscribeError::InvalidEmail.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), INVALID_EMAIL);
    }
}
