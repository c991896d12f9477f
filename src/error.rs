//! Stage-level error types for topic-unraveler

use std::fmt;

use thiserror::Error;

use crate::clients::GatewayError;

/// One structural problem found while validating a model payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Field path inside the payload, e.g. `comparisons[0].options`
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Main error type raised by the pipeline stages
#[derive(Error, Debug)]
pub enum UnravelerError {
    #[error("Input missing: {message}")]
    InputMissing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Extraction error: {message}")]
    Extraction { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Schema error: {}", join_violations(.violations))]
    Schema { violations: Vec<SchemaViolation> },
}

impl From<serde_json::Error> for UnravelerError {
    fn from(err: serde_json::Error) -> Self {
        UnravelerError::Parse {
            message: err.to_string(),
        }
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for pipeline stages
pub type Result<T> = std::result::Result<T, UnravelerError>;
