//! Error types for the interception engine.

use thiserror::Error;

/// Errors raised while building rules or handling control-plane commands.
///
/// Evaluating an exchange never fails: a kind with no matching rule simply
/// passes the exchange through unmodified.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Unsupported stub payload: {0}")]
    UnsupportedPayload(String),
    #[error("Invalid status code: {0}")]
    InvalidStatusCode(i64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Malformed command payload: {0}")]
    MalformedCommand(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InterceptError {
    pub(crate) fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        InterceptError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, InterceptError>;
