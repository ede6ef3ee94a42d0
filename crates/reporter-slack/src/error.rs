//! Error types for Slack API calls.

use thiserror::Error;

/// Errors that can occur calling the Slack Web API.
#[derive(Debug, Error)]
pub enum SlackError {
    /// Client misconfigured (empty token, unusable HTTP client).
    #[error("configuration error: {0}")]
    Config(String),

    /// Slack answered with `ok: false`.
    #[error("Slack API error in {method}: {code}")]
    Api {
        /// API method that failed.
        method: String,
        /// Slack error code (e.g. `channel_not_found`, `invalid_auth`).
        code: String,
    },

    /// Slack rate limited the call.
    #[error("rate limited in {method}: retry after {retry_after_secs} seconds")]
    RateLimited {
        /// API method that was limited.
        method: String,
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Non-2xx HTTP status.
    #[error("HTTP {status} from {method}: {body}")]
    Http {
        /// API method called.
        method: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Request timed out.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("invalid response: {0}")]
    Json(String),
}

impl SlackError {
    /// Slack error code, if Slack returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            SlackError::Api { code, .. } => Some(code),
            SlackError::RateLimited { .. } => Some("ratelimited"),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SlackError::Timeout(err.to_string())
        } else if err.is_connect() {
            SlackError::Network(format!("connection failed: {}", err))
        } else if err.is_decode() {
            SlackError::Json(err.to_string())
        } else {
            SlackError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SlackError {
    fn from(err: serde_json::Error) -> Self {
        SlackError::Json(err.to_string())
    }
}

/// Result type for Slack operations.
pub type Result<T> = std::result::Result<T, SlackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SlackError::Api {
            method: "chat.postMessage".into(),
            code: "channel_not_found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Slack API error in chat.postMessage: channel_not_found"
        );
        assert_eq!(err.code(), Some("channel_not_found"));

        let err = SlackError::RateLimited {
            method: "conversations.history".into(),
            retry_after_secs: 30,
        };
        assert!(err.to_string().contains("retry after 30 seconds"));
        assert_eq!(err.code(), Some("ratelimited"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SlackError = json_err.into();
        assert!(matches!(err, SlackError::Json(_)));
        assert_eq!(err.code(), None);
    }
}
