//! Research-assistant response pipeline: prompt building, model invocation, JSON extraction,
//! schema validation and failure classification for four research features.

pub mod classify;
pub mod clients;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod results;
pub mod retry;
pub mod schemas;

pub use classify::{ClassifiedError, ErrorKind};
pub use pipeline::{Invocation, Pipeline, PipelineStage};
pub use request::{Feature, FeatureRequest, PromptSpec, RequestBuilder};
pub use results::ValidatedResult;
