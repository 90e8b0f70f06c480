//! Renderer: the single terminal consumer of a [`ProcessingState`]

use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::debug;

use super::state::{ProcessingState, ResponseFormat};
use crate::error::{ApiError, ApiResult};

/// Turn a finished state into a response
///
/// A recorded error is handed back as `Err` untouched, for the error boundary to
/// encode. `Unknown` or `Unsupported` format without an error, or a missing payload,
/// means some path forgot to decide: an [`ApiError::InvariantViolation`].
pub fn render(state: ProcessingState) -> ApiResult<Response> {
    let decision = state.into_decision();

    if let Some(error) = decision.error {
        debug!(error = %error, "propagating recorded error from render");
        return Err(error);
    }

    let format = decision.format;
    let status = decision.status;
    let require_payload = |payload: Option<Value>| {
        payload.ok_or_else(|| {
            ApiError::InvariantViolation(format!(
                "request {:?} with {:?} format but no payload",
                status, format
            ))
        })
    };

    let response = match format {
        ResponseFormat::Unknown => {
            return Err(ApiError::InvariantViolation(
                "unknown response format should be known by render time".to_string(),
            ))
        }
        ResponseFormat::Unsupported => {
            return Err(ApiError::InvariantViolation(
                "unsupported response format reached render without an error".to_string(),
            ))
        }
        ResponseFormat::Html => match require_payload(decision.payload)? {
            Value::String(text) => Html(text).into_response(),
            other => Html(other.to_string()).into_response(),
        },
        ResponseFormat::Json => Json(require_payload(decision.payload)?).into_response(),
    };

    debug!(?format, status = response.status().as_u16(), "rendered");

    Ok(response)
}
