//! Ordered stage pipeline
//!
//! A [`Pipeline`] is an ordered list of route bindings (method filter, path pattern,
//! guarded stage). For each request it:
//! 1. creates a fresh [`ProcessingState`]
//! 2. runs content negotiation
//! 3. walks the bindings in registration order, invoking each matching stage through
//!    its [`Guarded`] wrapper, and stops as soon as the state is terminal
//! 4. hands the state to the renderer
//!
//! Patterns may overlap (`POST /v1/math/sums` and `ANY /v1/math/sums`); registration
//! order decides which one commits.

use axum::http::Method;
use axum::response::Response;
use sums_common::Error;
use tracing::debug;

use super::lifecycle::{Guarded, Stage, StageRequest};
use super::negotiation::negotiate;
use super::render::render;
use super::request::InboundRequest;
use super::state::ProcessingState;
use crate::error::ApiResult;

/// Which methods a binding accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatch {
    Any,
    Only(Method),
}

impl MethodMatch {
    /// `Only(GET)` also accepts HEAD; hyper drops the body on the way out
    fn accepts(&self, method: &Method) -> bool {
        match self {
            MethodMatch::Any => true,
            MethodMatch::Only(expected) => {
                expected == method || (*expected == Method::GET && *method == Method::HEAD)
            }
        }
    }
}

/// Path template (`/v1/math/sums/{id}`) or the catch-all
struct PathPattern {
    template: String,
    matcher: Option<matchit::Router<()>>,
}

impl PathPattern {
    fn any() -> Self {
        Self {
            template: "*".to_string(),
            matcher: None,
        }
    }

    fn template(template: &str) -> sums_common::Result<Self> {
        let mut matcher = matchit::Router::new();
        matcher
            .insert(template, ())
            .map_err(|e| Error::Config(format!("Invalid route pattern '{}': {}", template, e)))?;

        Ok(Self {
            template: template.to_string(),
            matcher: Some(matcher),
        })
    }

    fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let Some(matcher) = &self.matcher else {
            return Some(Vec::new());
        };

        matcher.at(path).ok().map(|matched| {
            matched
                .params
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        })
    }
}

struct RouteBinding {
    methods: MethodMatch,
    pattern: PathPattern,
    stage: Guarded<Box<dyn Stage>>,
}

impl RouteBinding {
    fn matches(&self, request: &InboundRequest) -> Option<Vec<(String, String)>> {
        if !self.methods.accepts(request.method()) {
            return None;
        }
        self.pattern.captures(request.path())
    }
}

/// Immutable, shareable stage table
pub struct Pipeline {
    bindings: Vec<RouteBinding>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder {
            bindings: Vec::new(),
        }
    }

    /// Run negotiation and the stage walk, returning the decided (unrendered) state
    pub fn decide(&self, request: &InboundRequest) -> ApiResult<ProcessingState> {
        let mut state = ProcessingState::new();

        negotiate(request, &mut state)?;
        if state.is_format_unsupported() {
            debug!(path = request.path(), "negotiation rejected request, route stages skipped");
        }

        for binding in &self.bindings {
            if state.is_terminal() {
                break;
            }
            let Some(params) = binding.matches(request) else {
                continue;
            };

            debug!(
                stage = binding.stage.name(),
                pattern = %binding.pattern.template,
                "route matched"
            );
            binding
                .stage
                .invoke(&StageRequest::new(request, params), &mut state)?;
        }

        Ok(state)
    }

    /// Decide and render one request
    pub fn handle(&self, request: &InboundRequest) -> ApiResult<Response> {
        render(self.decide(request)?)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Collects bindings in registration order
pub struct PipelineBuilder {
    bindings: Vec<RouteBinding>,
}

impl PipelineBuilder {
    /// Bind `stage` to `methods` on the path `template`
    pub fn route(
        mut self,
        methods: MethodMatch,
        template: &str,
        stage: impl Stage + 'static,
    ) -> sums_common::Result<Self> {
        let stage: Box<dyn Stage> = Box::new(stage);
        self.bindings.push(RouteBinding {
            methods,
            pattern: PathPattern::template(template)?,
            stage: Guarded::new(stage),
        });
        Ok(self)
    }

    /// Bind `stage` to every method and path; register last
    pub fn fallback(mut self, stage: impl Stage + 'static) -> Self {
        let stage: Box<dyn Stage> = Box::new(stage);
        self.bindings.push(RouteBinding {
            methods: MethodMatch::Any,
            pattern: PathPattern::any(),
            stage: Guarded::new(stage),
        });
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            bindings: self.bindings,
        }
    }
}
