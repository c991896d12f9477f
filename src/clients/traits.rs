use async_trait::async_trait;
use thiserror::Error;

use crate::request::PromptSpec;

/// Opaque reply text returned by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse {
    pub text: String,
}

impl RawModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{var} is not configured")]
    MissingCredential { var: String },
    #[error("AI request failed: {status}")]
    Status { status: u16, body: String },
    #[error("AI request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("AI request transport error: {0}")]
    Transport(String),
    #[error("AI response envelope malformed: {0}")]
    InvalidEnvelope(String),
}

/// Boundary to the language model endpoint.
///
/// Implementations send one system + user message pair and hand back the assistant text
/// untouched; every interpretation of that text happens in the pipeline.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, prompt: &PromptSpec) -> Result<RawModelResponse, GatewayError>;
}
