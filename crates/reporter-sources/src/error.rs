//! Connector errors.

use reporter_models::SectionKind;
use reporter_slack::SlackError;
use thiserror::Error;

/// Errors a connector can fail with.
///
/// Every variant names the section it came from so the request handler can
/// degrade the right section and report the vendor's own error code.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connector cannot run with the given settings or local files.
    #[error("{} configuration error: {detail}", .section.vendor())]
    Config { section: SectionKind, detail: String },

    /// Credentials were rejected or could not be refreshed.
    #[error("{} authentication failed: {detail}", .section.vendor())]
    Auth { section: SectionKind, detail: String },

    /// Vendor answered with a non-2xx status.
    #[error("{} HTTP {status}: {body}", .section.vendor())]
    Http {
        section: SectionKind,
        status: u16,
        body: String,
    },

    /// Vendor answered 2xx with an error code in the body.
    #[error("{} API error: {code}", .section.vendor())]
    Api { section: SectionKind, code: String },

    /// Request timed out.
    #[error("{} request timed out", .section.vendor())]
    Timeout { section: SectionKind },

    /// Transport failure.
    #[error("{} network error: {detail}", .section.vendor())]
    Network { section: SectionKind, detail: String },

    /// Response body did not have the expected shape.
    #[error("{} returned an invalid response: {detail}", .section.vendor())]
    InvalidResponse { section: SectionKind, detail: String },
}

impl SourceError {
    /// Section the error belongs to.
    pub fn section(&self) -> SectionKind {
        match self {
            Self::Config { section, .. }
            | Self::Auth { section, .. }
            | Self::Http { section, .. }
            | Self::Api { section, .. }
            | Self::Timeout { section }
            | Self::Network { section, .. }
            | Self::InvalidResponse { section, .. } => *section,
        }
    }

    /// Vendor status or error code, when the vendor supplied one.
    pub fn vendor_code(&self) -> Option<String> {
        match self {
            Self::Http { status, .. } => Some(status.to_string()),
            Self::Api { code, .. } => Some(code.clone()),
            _ => None,
        }
    }

    /// Classifies a transport error.
    pub fn from_reqwest(section: SectionKind, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { section }
        } else if err.is_decode() {
            Self::InvalidResponse {
                section,
                detail: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::Http {
                section,
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Network {
                section,
                detail: err.to_string(),
            }
        }
    }

    /// Builds an error from a non-2xx response, consuming its body.
    pub(crate) async fn from_response(section: SectionKind, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Http {
            section,
            status,
            body: body.trim().to_string(),
        }
    }
}

impl From<SlackError> for SourceError {
    fn from(err: SlackError) -> Self {
        let section = SectionKind::Slack;
        match err {
            SlackError::Config(detail) => Self::Config { section, detail },
            SlackError::Api { code, .. } => Self::Api { section, code },
            SlackError::RateLimited { .. } => Self::Api {
                section,
                code: "ratelimited".to_string(),
            },
            SlackError::Http { status, body, .. } => Self::Http {
                section,
                status,
                body,
            },
            SlackError::Timeout(_) => Self::Timeout { section },
            SlackError::Network(detail) => Self::Network { section, detail },
            SlackError::Json(detail) => Self::InvalidResponse { section, detail },
        }
    }
}

/// Result type for connector operations.
pub type Result<T> = std::result::Result<T, SourceError>;
