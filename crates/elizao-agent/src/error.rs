//! Error types for the agent crate.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle phase in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Think,
    Act,
    Observe,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Think => write!(f, "think"),
            Self::Act => write!(f, "act"),
            Self::Observe => write!(f, "observe"),
        }
    }
}

/// Errors raised by language-model backends.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The request never got a response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The backend cannot be used with the given settings.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors that can occur in agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A capability the agent depends on could not be wired.
    #[error("agent initialization failed: {0}")]
    Initialization(String),

    /// A phase received input it cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Model output could not be interpreted.
    #[error("failed to parse model response: {0}")]
    ResponseParse(String),

    /// Language-model call failed.
    #[error("model invocation failed: {0}")]
    Model(#[from] ModelError),

    /// Persistence call failed.
    #[error("persistence failed: {0}")]
    Persistence(#[from] elizao_persistence::PersistenceError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::Model(ModelError::Status {
            status: 503,
            body: "busy".into(),
        });
        assert_eq!(err.to_string(), "model invocation failed: backend returned 503: busy");

        let err = AgentError::Initialization("missing ATOMA_API_KEY".into());
        assert_eq!(
            err.to_string(),
            "agent initialization failed: missing ATOMA_API_KEY"
        );
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Think.to_string(), "think");
        assert_eq!(Phase::Observe.to_string(), "observe");
    }
}
