//! Content negotiation
//!
//! Runs before any route stage:
//! - no content-type header → nothing decided; route stages pick their default
//! - `application/json` (parameters such as `charset` ignored) → format `Json`
//! - anything else → format `Unsupported` plus an `UnsupportedMediaType` error, which
//!   stops the pipeline before business logic runs

use tracing::debug;

use super::request::InboundRequest;
use super::state::{ProcessingState, ResponseFormat};
use crate::error::{ApiError, ApiResult};

/// The one media type this service accepts
pub const SUPPORTED_MEDIA_TYPE: &str = "application/json";

/// Inspect the content-type header and record the outcome
pub fn negotiate(request: &InboundRequest, state: &mut ProcessingState) -> ApiResult<()> {
    let Some(value) = request.content_type() else {
        debug!("no content-type header, format left to route stages");
        return Ok(());
    };

    if is_supported(value) {
        state.set_format(ResponseFormat::Json);
        return Ok(());
    }

    debug!(content_type = value, "content-type rejected");
    state.set_format(ResponseFormat::Unsupported);
    state.set_error(ApiError::UnsupportedMediaType(value.to_string()))
}

/// Compare the media type essence, ignoring parameters and case
fn is_supported(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(SUPPORTED_MEDIA_TYPE)
}
