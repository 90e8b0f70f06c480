//! Error types for sums-server
//!
//! `ApiError` is the single failure type of the request core: stages return it,
//! the processing state records it, and the axum boundary turns it into a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cache::CacheError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed, missing or non-integer input (400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Content-type header names something other than JSON (415)
    #[error("Unsupported content-type \"{0}\"")]
    UnsupportedMediaType(String),

    /// Unknown id or unmatched route (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Route exists but not for this method (405)
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    /// Processing state reached an impossible shape; a defect, not a user error (500)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// sums-common error
    #[error("Common error: {0}")]
    Common(#[from] sums_common::Error),
}

impl ApiError {
    /// HTTP status for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvariantViolation(_) | ApiError::Internal(_) | ApiError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code used in the error body
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "BAD_REQUEST",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ApiError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Common(_) => "COMMON_ERROR",
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Validation(msg) => ApiError::Validation(msg),
            CacheError::NotFound(id) => ApiError::NotFound(format!("sum {}", id)),
            inconsistent @ CacheError::Inconsistent(_) => {
                ApiError::InvariantViolation(inconsistent.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed with server error");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for the request core
pub type ApiResult<T> = Result<T, ApiError>;
