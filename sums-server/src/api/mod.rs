//! HTTP surface: the route table and the axum entry point
//!
//! Every request reaches [`dispatch`], which hands it to the shared [`Pipeline`].

pub mod errors;
pub mod greeting;
pub mod health;
pub mod math;
pub mod sums;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::cache::SumCache;
use crate::error::ApiResult;
use crate::processing::{InboundRequest, MethodMatch, Pipeline};
use crate::AppState;

/// Route table, in matching order
///
/// | Method | Path                  | Stage                  |
/// |--------|-----------------------|------------------------|
/// | GET    | `/`                   | greeting (HTML)        |
/// | GET    | `/v1`                 | greeting (HTML)        |
/// | ANY    | `/v1/math`            | sub-route listing      |
/// | POST   | `/v1/math/sums`       | create                 |
/// | ANY    | `/v1/math/sums`       | 405                    |
/// | GET    | `/v1/math/sums/{id}`  | fetch                  |
/// | ANY    | `/v1/math/sums/{id}`  | 405                    |
/// | GET    | `/health`             | health                 |
/// | ANY    | anything else         | 404                    |
pub fn build_pipeline(cache: Arc<SumCache>) -> ApiResult<Pipeline> {
    let pipeline = Pipeline::builder()
        .route(MethodMatch::Only(Method::GET), "/", greeting::HtmlGreeting::root())?
        .route(MethodMatch::Only(Method::GET), "/v1", greeting::HtmlGreeting::v1())?
        .route(MethodMatch::Any, "/v1/math", math::MathIndex)?
        .route(
            MethodMatch::Only(Method::POST),
            "/v1/math/sums",
            sums::CreateSum::new(Arc::clone(&cache)),
        )?
        .route(MethodMatch::Any, "/v1/math/sums", errors::MethodNotAllowed)?
        .route(
            MethodMatch::Only(Method::GET),
            "/v1/math/sums/{id}",
            sums::FetchSum::new(cache),
        )?
        .route(MethodMatch::Any, "/v1/math/sums/{id}", errors::MethodNotAllowed)?
        .route(MethodMatch::Only(Method::GET), "/health", health::Health)?
        .fallback(errors::NotFound)
        .build();

    Ok(pipeline)
}

/// Router fallback: every request goes through the pipeline
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = InboundRequest::from_parts(method, &uri, &headers, body);

    match state.pipeline.handle(&request) {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}
