//! Error types for the agent crate.

use thiserror::Error;

/// Errors that can occur while producing an analysis.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The report handed to the agent was empty.
    #[error("input report was empty")]
    EmptyInput,

    /// The model endpoint could not be reached.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// The model endpoint answered with a non-2xx status.
    #[error("model API error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The model call timed out.
    #[error("model request timed out: {0}")]
    Timeout(String),

    /// Response parsing failed.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// The model returned no text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Tool not found.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed.
    #[error("tool execution failed: {tool_name}: {message}")]
    ToolExecution {
        /// Name of the tool that failed.
        tool_name: String,
        /// Error message.
        message: String,
    },

    /// Maximum iterations exceeded in tool loop.
    #[error("maximum iterations ({0}) exceeded in tool execution loop")]
    MaxIterationsExceeded(u32),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Timeout(err.to_string())
        } else if err.is_decode() {
            AgentError::ResponseParse(err.to_string())
        } else {
            AgentError::ModelInvocation(err.to_string())
        }
    }
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::ToolExecution {
            tool_name: "lookup_card".into(),
            message: "board not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "tool execution failed: lookup_card: board not found"
        );

        let err = AgentError::Http {
            status: 402,
            body: "insufficient credits".into(),
        };
        assert_eq!(err.to_string(), "model API error 402: insufficient credits");

        let err = AgentError::MaxIterationsExceeded(4);
        assert_eq!(
            err.to_string(),
            "maximum iterations (4) exceeded in tool execution loop"
        );
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(matches!(err, AgentError::Serialization(_)));
    }
}
