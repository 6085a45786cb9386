//! Error types with HTTP status code mapping.
//!
//! Session operations never fail with an error: their results travel as
//! [`crate::domain::SessionOutcome`] values. [`SessionError`] covers what
//! is left, namely input validation and the control surface talking to the
//! driver task.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: max_public_slots must be positive",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Validation and control-surface errors.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | Not Found       | 404 Not Found             |
/// | 3000–3999 | Server          | 503 Service Unavailable   |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The match type is empty or otherwise unusable as an attribute.
    #[error("invalid match type: {0:?}")]
    InvalidMatchType(String),

    /// No search result exists at the given index of the last search.
    #[error("search result {0} not found")]
    SearchResultNotFound(usize),

    /// The driver task has stopped and no longer accepts commands.
    #[error("session driver is not running")]
    DriverUnavailable,
}

impl SessionError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidMatchType(_) => 1002,
            Self::SearchResultNotFound(_) => 2001,
            Self::DriverUnavailable => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidMatchType(_) => StatusCode::BAD_REQUEST,
            Self::SearchResultNotFound(_) => StatusCode::NOT_FOUND,
            Self::DriverUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
