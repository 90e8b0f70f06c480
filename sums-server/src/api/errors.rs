//! Terminal error stages: unmatched routes and unsupported methods

use crate::error::{ApiError, ApiResult};
use crate::processing::{ProcessingState, Stage, StageRequest};

/// Catch-all for paths no other stage claimed
pub struct NotFound;

impl Stage for NotFound {
    fn name(&self) -> &'static str {
        "errors.not_found"
    }

    fn run(&self, request: &StageRequest<'_>, _state: &mut ProcessingState) -> ApiResult<()> {
        Err(ApiError::NotFound(request.request().path().to_string()))
    }
}

/// Bound with `MethodMatch::Any` after the real handlers of a path
pub struct MethodNotAllowed;

impl Stage for MethodNotAllowed {
    fn name(&self) -> &'static str {
        "errors.method_not_allowed"
    }

    fn run(&self, request: &StageRequest<'_>, _state: &mut ProcessingState) -> ApiResult<()> {
        let inbound = request.request();
        Err(ApiError::MethodNotAllowed {
            method: inbound.method().to_string(),
            path: inbound.path().to_string(),
        })
    }
}
