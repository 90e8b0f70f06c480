//! Fixed HTML greetings for `GET /` and `GET /v1`

use serde_json::Value;

use crate::error::ApiResult;
use crate::processing::{ProcessingState, ResponseFormat, Stage, StageRequest};

pub const GREETING_HTML: &str = "<h1>Hello World</h1>";

/// Answers with the greeting page, overriding any negotiated format
pub struct HtmlGreeting {
    name: &'static str,
}

impl HtmlGreeting {
    pub fn root() -> Self {
        Self { name: "root.greeting" }
    }

    pub fn v1() -> Self {
        Self { name: "v1.greeting" }
    }
}

impl Stage for HtmlGreeting {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&self, _request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()> {
        state.set_payload(Value::String(GREETING_HTML.to_string()))?;
        state.set_format(ResponseFormat::Html);
        Ok(())
    }
}
