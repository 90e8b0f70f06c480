//! Staged response processing
//!
//! Separates deciding what to answer (stages mutating a per-request
//! [`ProcessingState`]) from emitting the answer ([`render`]).

pub mod lifecycle;
pub mod negotiation;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod state;

pub use lifecycle::{Guarded, Stage, StageRequest};
pub use negotiation::negotiate;
pub use pipeline::{MethodMatch, Pipeline, PipelineBuilder};
pub use render::render;
pub use request::InboundRequest;
pub use state::{Decision, ProcessingState, ProcessingStatus, ResponseFormat};
