//! Failure taxonomy shared by every surface of the pipeline.
//!
//! Stage errors ([`UnravelerError`]) are converted into a [`ClassifiedError`] exactly once, at
//! the pipeline boundary. Callers decide on retries from `retryable`; nothing here retries.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::clients::GatewayError;
use crate::error::UnravelerError;

pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again in a moment.";
pub const QUOTA_EXHAUSTED_MESSAGE: &str =
    "AI credits exhausted. Please add credits to your workspace.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InputMissing,
    ConfigError,
    RateLimited,
    QuotaExhausted,
    UpstreamError,
    ExtractionError,
    ParseError,
    SchemaError,
}

impl ErrorKind {
    /// Extraction, parse and schema failures all stem from non-deterministic model output.
    pub fn is_model_output(self) -> bool {
        matches!(
            self,
            ErrorKind::ExtractionError | ErrorKind::ParseError | ErrorKind::SchemaError
        )
    }

    /// Whether re-issuing the whole request may succeed.
    pub fn retryable(self) -> bool {
        self == ErrorKind::RateLimited || self.is_model_output()
    }

    /// Status code used when the error crosses the HTTP boundary.
    pub fn response_status(self) -> u16 {
        match self {
            ErrorKind::RateLimited => 429,
            ErrorKind::QuotaExhausted => 402,
            _ => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InputMissing => "InputMissing",
            ErrorKind::ConfigError => "ConfigError",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::QuotaExhausted => "QuotaExhausted",
            ErrorKind::UpstreamError => "UpstreamError",
            ErrorKind::ExtractionError => "ExtractionError",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::SchemaError => "SchemaError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomy entry describing why an invocation failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
    /// Status returned by the model gateway, when the failure came from one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: kind.retryable(),
            http_status: None,
        }
    }

    fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

/// Map a stage failure onto its taxonomy entry.
pub fn classify(err: UnravelerError) -> ClassifiedError {
    match err {
        UnravelerError::InputMissing { message } => {
            ClassifiedError::new(ErrorKind::InputMissing, message)
        }
        UnravelerError::Config { message } => ClassifiedError::new(ErrorKind::ConfigError, message),
        UnravelerError::Gateway(gw) => classify_gateway(gw),
        UnravelerError::Extraction { message } => {
            ClassifiedError::new(ErrorKind::ExtractionError, message)
        }
        UnravelerError::Parse { message } => ClassifiedError::new(
            ErrorKind::ParseError,
            format!("AI response was not valid JSON: {message}"),
        ),
        err @ UnravelerError::Schema { .. } => {
            ClassifiedError::new(ErrorKind::SchemaError, err.to_string())
        }
    }
}

fn classify_gateway(err: GatewayError) -> ClassifiedError {
    match err {
        GatewayError::MissingCredential { var } => ClassifiedError::new(
            ErrorKind::ConfigError,
            format!("{var} is not configured"),
        ),
        GatewayError::Status { status: 429, .. } => {
            ClassifiedError::new(ErrorKind::RateLimited, RATE_LIMITED_MESSAGE).with_status(429)
        }
        GatewayError::Status { status: 402, .. } => {
            ClassifiedError::new(ErrorKind::QuotaExhausted, QUOTA_EXHAUSTED_MESSAGE)
                .with_status(402)
        }
        GatewayError::Status { status, body } => ClassifiedError::new(
            ErrorKind::UpstreamError,
            format!("AI request failed: {status} {}", body.trim()),
        )
        .with_status(status),
        other => ClassifiedError::new(ErrorKind::UpstreamError, other.to_string()),
    }
}

impl From<UnravelerError> for ClassifiedError {
    fn from(err: UnravelerError) -> Self {
        classify(err)
    }
}
