//! Per-request failure outcomes of the board.
//!
//! None of these are fatal to the process. The two throttle variants are
//! transient and tell the caller to back off; validation and authentication
//! failures need corrected input.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Seconds suggested to callers in `Retry-After` when throttled.
const RETRY_AFTER_SECS: &str = "60";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Global request capacity for the current window is used up.
    #[error("The board is busy right now. Please try again later.")]
    Throttled,

    /// This client has used its personal quota for the current window.
    #[error("You are posting too fast. Please wait a moment.")]
    RateLimited,

    #[error("{0}")]
    Validation(String),

    /// Reserved username with a missing or wrong password.
    #[error("Invalid username or password.")]
    Authentication,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BoardError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Throttled | Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Throttled => "throttled",
            Self::RateLimited => "rate_limited",
            Self::Validation(_) => "validation",
            Self::Authentication => "authentication",
            Self::Internal(_) => "internal",
        }
    }

    pub fn retryable(&self) -> bool {
        matches!(self, Self::Throttled | Self::RateLimited)
    }

    /// `Retry-After` value for retryable errors.
    pub fn retry_after(&self) -> Option<&'static str> {
        self.retryable().then_some(RETRY_AFTER_SECS)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    retryable: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retryable = self.retryable();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
                retryable,
            },
        };

        let retry_after = self.retry_after();
        let mut response = (status, Json(body)).into_response();
        if let Some(retry_after) = retry_after {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                header::HeaderValue::from_static(retry_after),
            );
        }
        response
    }
}
