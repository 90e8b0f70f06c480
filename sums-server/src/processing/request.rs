//! Parsed inbound request handed to the pipeline by the transport

use axum::body::Bytes;
use axum::http::{header::CONTENT_TYPE, HeaderMap, Method, Uri};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Method, path, content-type and raw body of one request
#[derive(Debug, Clone)]
pub struct InboundRequest {
    method: Method,
    path: String,
    content_type: Option<String>,
    body: Bytes,
}

impl InboundRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: normalize_path(path),
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build from what axum extracted
    ///
    /// A content-type header that is not valid UTF-8 is kept (lossily) so negotiation
    /// can reject it rather than pretend it was absent.
    pub fn from_parts(method: Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> Self {
        let content_type = headers
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        Self {
            method,
            path: normalize_path(uri.path()),
            content_type,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Decode the body as JSON; `None` for an empty body
    pub fn json_body(&self) -> ApiResult<Option<Value>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| ApiError::Validation(format!("Malformed JSON body: {}", e)))
    }
}

/// `/v1/math/` and `/v1/math` route identically; `/` stays `/`
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
