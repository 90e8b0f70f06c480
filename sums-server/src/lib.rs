//! sums-server library - content-addressed integer sums over HTTP
//!
//! Requests are decided by a staged [`processing::Pipeline`] and answered from a
//! process-wide [`cache::SumCache`].

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cache;
pub mod error;
pub mod processing;

use cache::SumCache;
use error::ApiResult;
use processing::Pipeline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Sets submitted over the life of the process
    pub cache: Arc<SumCache>,
    /// Route table, built once at startup
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Create state with an empty cache and the default route table
    pub fn new() -> ApiResult<Self> {
        let cache = Arc::new(SumCache::new());
        let pipeline = Arc::new(api::build_pipeline(Arc::clone(&cache))?);
        Ok(Self { cache, pipeline })
    }
}

/// Build application router
///
/// Routing is done by the pipeline, so axum only contributes the fallback handler
/// plus body limit and request tracing.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .fallback(api::dispatch)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
