//! Health check endpoint

use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::processing::{ProcessingState, ResponseFormat, Stage, StageRequest};

/// Health check response: status, module name, and version
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
pub struct Health;

impl Stage for Health {
    fn name(&self) -> &'static str {
        "health"
    }

    fn run(&self, _request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()> {
        let body = HealthResponse {
            status: "ok".to_string(),
            module: "sums-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        let payload = serde_json::to_value(body)
            .map_err(|e| ApiError::Internal(format!("Failed to encode health response: {}", e)))?;

        state.default_format(ResponseFormat::Json);
        state.set_payload(payload)
    }
}
