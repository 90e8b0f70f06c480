//! `/v1/math/sums` resource
//!
//! - `POST /v1/math/sums` with `{ "set": [integers] }` → `{ set, sum, id }`
//! - `GET /v1/math/sums/{id}` → the stored `{ set, sum, id }`

use std::sync::Arc;

use serde_json::Value;

use crate::cache::{SumCache, SumView};
use crate::error::{ApiError, ApiResult};
use crate::processing::{ProcessingState, ResponseFormat, Stage, StageRequest};

fn commit_view(view: &SumView, state: &mut ProcessingState) -> ApiResult<()> {
    let payload = serde_json::to_value(view)
        .map_err(|e| ApiError::Internal(format!("Failed to encode sum: {}", e)))?;

    state.default_format(ResponseFormat::Json);
    state.set_payload(payload)
}

/// POST: submit a set to the cache
pub struct CreateSum {
    cache: Arc<SumCache>,
}

impl CreateSum {
    pub fn new(cache: Arc<SumCache>) -> Self {
        Self { cache }
    }
}

impl Stage for CreateSum {
    fn name(&self) -> &'static str {
        "sums.create"
    }

    fn run(&self, request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()> {
        let body = request.request().json_body()?;
        let set = body
            .as_ref()
            .and_then(|body: &Value| body.get("set"))
            .ok_or_else(|| ApiError::Validation("Missing `set` key in request body".to_string()))?;

        let view = self.cache.submit(set)?;
        commit_view(&view, state)
    }
}

/// GET: fetch a stored set by id
pub struct FetchSum {
    cache: Arc<SumCache>,
}

impl FetchSum {
    pub fn new(cache: Arc<SumCache>) -> Self {
        Self { cache }
    }
}

impl Stage for FetchSum {
    fn name(&self) -> &'static str {
        "sums.fetch"
    }

    fn run(&self, request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()> {
        let id = request
            .param("id")
            .ok_or_else(|| ApiError::Internal("no `id` param captured for sums.fetch".to_string()))?;

        let view = self.cache.lookup(id)?;
        commit_view(&view, state)
    }
}
