//! `/v1/math` index

use serde_json::json;

use crate::error::ApiResult;
use crate::processing::{ProcessingState, ResponseFormat, Stage, StageRequest};

/// Sub-routes advertised by the index
pub const MATH_ROUTES: [&str; 1] = ["/v1/math/sums"];

/// Lists the available math resources; answers every method
pub struct MathIndex;

impl Stage for MathIndex {
    fn name(&self) -> &'static str {
        "math.index"
    }

    fn run(&self, _request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()> {
        state.default_format(ResponseFormat::Json);
        state.set_payload(json!({ "routes": MATH_ROUTES }))
    }
}
