//! HTTP error taxonomy
//!
//! Status codes the platform documents get their own variant; any other
//! failure status lands in [`HttpError::Status`].

use chat_common::ErrorResponse;
use reqwest::StatusCode;
use thiserror::Error;

/// A failed response: what was asked, what came back
#[derive(Debug, Clone)]
pub struct RemoteError {
    pub status: u16,
    pub path: String,
    pub body: ErrorResponse,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}: {}", self.status, self.path, self.body)
    }
}

/// REST client errors
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Unauthorized: {0}")]
    Unauthorized(RemoteError),

    #[error("Forbidden: {0}")]
    Forbidden(RemoteError),

    #[error("Not found: {0}")]
    NotFound(RemoteError),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(RemoteError),

    #[error("Rate limited: {0}")]
    TooManyRequests(RemoteError),

    #[error("Request failed: {0}")]
    Status(RemoteError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("Invalid bot token header")]
    InvalidToken,

    #[error("Application id is not known until the session is ready")]
    MissingApplicationId,
}

impl HttpError {
    /// Map a failure status to its error variant; `None` for success statuses
    pub fn from_status(status: StatusCode, path: impl Into<String>, body: &str) -> Option<Self> {
        if !(status.is_client_error() || status.is_server_error()) {
            return None;
        }

        let remote = RemoteError {
            status: status.as_u16(),
            path: path.into(),
            body: ErrorResponse::from_body(body),
        };

        Some(match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(remote),
            StatusCode::FORBIDDEN => Self::Forbidden(remote),
            StatusCode::NOT_FOUND => Self::NotFound(remote),
            StatusCode::METHOD_NOT_ALLOWED => Self::MethodNotAllowed(remote),
            StatusCode::TOO_MANY_REQUESTS => Self::TooManyRequests(remote),
            _ => Self::Status(remote),
        })
    }

    /// The remote error, for errors that came from a response
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Unauthorized(r)
            | Self::Forbidden(r)
            | Self::NotFound(r)
            | Self::MethodNotAllowed(r)
            | Self::TooManyRequests(r)
            | Self::Status(r) => Some(r),
            Self::Transport(_)
            | Self::InvalidBody(_)
            | Self::InvalidToken
            | Self::MissingApplicationId => None,
        }
    }

    /// HTTP status of the failed response
    pub fn status(&self) -> Option<u16> {
        self.remote().map(|r| r.status)
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::TooManyRequests(_))
    }

    /// Seconds the platform asked us to wait, on rate-limit errors
    pub fn retry_after(&self) -> Option<f64> {
        match self {
            Self::TooManyRequests(r) => r.body.retry_after,
            _ => None,
        }
    }
}

/// Result type alias for REST calls
pub type HttpResult<T> = Result<T, HttpError>;
