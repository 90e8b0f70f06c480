//! Request lifecycle controller
//!
//! [`Guarded`] wraps a [`Stage`] so that, per request, only the first stage to commit
//! an answer has any effect:
//! - state already `Handled` → the stage is skipped
//! - otherwise the stage runs; an `Err` it returns is recorded as the request's error
//! - afterwards the request is marked `Handled` unless it ended up `Errored`
//!
//! The guard looks only at the status flag, never at what other stages did. Skipping
//! stages after an error is the pipeline's job (it stops walking once the state is terminal).

use tracing::debug;

use super::request::InboundRequest;
use super::state::ProcessingState;
use crate::error::ApiResult;

/// A request plus the parameters captured by the route pattern that selected the stage
#[derive(Debug)]
pub struct StageRequest<'a> {
    request: &'a InboundRequest,
    params: Vec<(String, String)>,
}

impl<'a> StageRequest<'a> {
    pub fn new(request: &'a InboundRequest, params: Vec<(String, String)>) -> Self {
        Self { request, params }
    }

    pub fn request(&self) -> &'a InboundRequest {
        self.request
    }

    /// Captured path parameter, e.g. `id` for `/v1/math/sums/{id}`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One unit of request handling
///
/// Stages write their decision into the [`ProcessingState`]; they never emit a response.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()>;
}

impl<S: Stage + ?Sized> Stage for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn run(&self, request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()> {
        (**self).run(request, state)
    }
}

/// First-writer-wins wrapper around a stage
pub struct Guarded<S> {
    stage: S,
}

impl<S: Stage> Guarded<S> {
    pub fn new(stage: S) -> Self {
        Self { stage }
    }

    pub fn name(&self) -> &'static str {
        self.stage.name()
    }

    /// Run the stage unless the request is already handled
    ///
    /// Returns `Err` only when the stage's failure could not be recorded, which means
    /// the state was already terminal: a pipeline defect.
    pub fn invoke(&self, request: &StageRequest<'_>, state: &mut ProcessingState) -> ApiResult<()> {
        if state.is_handled() {
            debug!(stage = self.name(), "request already handled, stage skipped");
            return Ok(());
        }

        debug!(stage = self.name(), "stage invoked");
        if let Err(err) = self.stage.run(request, state) {
            state.set_error(err)?;
        }
        state.mark_handled();
        Ok(())
    }
}
