//! Per-request response processing state
//!
//! Stages decide *what* to answer by mutating a [`ProcessingState`]; the renderer
//! decides *how* to emit it. One state exists per in-flight request: it is created by
//! [`ProcessingState::new`] when the request arrives, borrowed mutably by each stage in
//! turn, and consumed by value at render time, so it can never leak into another request.
//!
//! Status only moves forward:
//!
//! ```text
//! Unhandled ──► Handled
//!     │
//!     └───────► Errored
//! ```
//!
//! Once terminal, the payload and error are frozen.

use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// How the payload will be encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Nothing decided yet; must not survive to render
    #[default]
    Unknown,
    Html,
    Json,
    /// Content negotiation rejected the request
    Unsupported,
}

/// Where the request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStatus {
    #[default]
    Unhandled,
    Handled,
    Errored,
}

impl ProcessingStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProcessingStatus::Unhandled)
    }
}

/// Decision record for one request
#[derive(Debug, Default)]
pub struct ProcessingState {
    format: ResponseFormat,
    payload: Option<Value>,
    status: ProcessingStatus,
    error: Option<ApiError>,
}

/// Everything the renderer needs, taken out of a consumed [`ProcessingState`]
#[derive(Debug)]
pub struct Decision {
    pub format: ResponseFormat,
    pub payload: Option<Value>,
    pub status: ProcessingStatus,
    pub error: Option<ApiError>,
}

impl ProcessingState {
    /// Fresh state for an incoming request: `Unknown` format, `Unhandled`, no payload or error
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Choose the response encoding
    pub fn set_format(&mut self, format: ResponseFormat) {
        debug!(from = ?self.format, to = ?format, "response format set");
        self.format = format;
    }

    /// Choose `format` only if nothing has been decided yet
    ///
    /// Used by stages whose natural encoding is a default, so they do not override
    /// an earlier decision (including `Unsupported`).
    pub fn default_format(&mut self, format: ResponseFormat) {
        if self.format == ResponseFormat::Unknown {
            self.set_format(format);
        }
    }

    /// Commit the value to render
    pub fn set_payload(&mut self, payload: Value) -> ApiResult<()> {
        if self.status.is_terminal() {
            return Err(ApiError::InvariantViolation(format!(
                "payload mutation after request became {:?}",
                self.status
            )));
        }
        debug!(payload = %payload, "response payload set");
        self.payload = Some(payload);
        Ok(())
    }

    /// Record a failure; forces status to `Errored`
    ///
    /// Only an `Unhandled` request can fail. The first recorded error wins.
    pub fn set_error(&mut self, error: ApiError) -> ApiResult<()> {
        if self.status.is_terminal() {
            return Err(ApiError::InvariantViolation(format!(
                "error \"{}\" recorded after request became {:?}",
                error, self.status
            )));
        }
        debug!(error = %error, "response status set to: errored");
        self.error = Some(error);
        self.status = ProcessingStatus::Errored;
        Ok(())
    }

    /// Commit the answer. No-op once `Errored`; idempotent once `Handled`.
    pub fn mark_handled(&mut self) {
        if self.status == ProcessingStatus::Unhandled {
            debug!("response status set to: handled");
            self.status = ProcessingStatus::Handled;
        }
    }

    pub fn is_handled(&self) -> bool {
        self.status == ProcessingStatus::Handled
    }

    pub fn is_errored(&self) -> bool {
        self.status == ProcessingStatus::Errored
    }

    /// Handled or errored: no further stage may run
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_format_unsupported(&self) -> bool {
        self.format == ResponseFormat::Unsupported
    }

    /// Consume the state; only the renderer should call this
    pub fn into_decision(self) -> Decision {
        Decision {
            format: self.format,
            payload: self.payload,
            status: self.status,
            error: self.error,
        }
    }
}
