//! Report response types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::RequestId;
use crate::section::{SectionKind, StructuredReport};

/// Outcome of posting the analysis to Slack.
///
/// Serialized as a single display string (`success: ...`, `failed: ...`,
/// `skipped: ...`) so the wire format stays a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NotificationStatus {
    /// Message posted.
    Success(String),
    /// Posting was attempted and failed.
    Failed(String),
    /// Posting was not attempted.
    Skipped(String),
    /// Status string that does not follow the known prefixes.
    Other(String),
}

impl NotificationStatus {
    /// Creates a success status.
    pub fn success(detail: impl Into<String>) -> Self {
        Self::Success(detail.into())
    }

    /// Creates a failure status.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    /// Creates a skipped status.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }

    /// Returns true if the message was posted.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if posting was attempted and failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if posting was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(detail) => write!(f, "success: {}", detail),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
            Self::Skipped(reason) => write!(f, "skipped: {}", reason),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

impl From<NotificationStatus> for String {
    fn from(status: NotificationStatus) -> Self {
        status.to_string()
    }
}

impl From<String> for NotificationStatus {
    fn from(raw: String) -> Self {
        if let Some(rest) = raw.strip_prefix("success: ") {
            Self::Success(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("failed: ") {
            Self::Failed(rest.to_string())
        } else if let Some(rest) = raw.strip_prefix("skipped: ") {
            Self::Skipped(rest.to_string())
        } else {
            Self::Other(raw)
        }
    }
}

/// A connector that could not deliver its data for this request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Section the failure degraded.
    pub source: SectionKind,
    /// Operator-facing error detail (vendor status or error code included).
    pub detail: String,
}

/// Response payload of `GET /api/v1/report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Markdown report exactly as sent to the analysis agent.
    pub raw_report: String,

    /// Agent analysis, or an explicit error placeholder.
    pub agent_analysis: String,

    /// Notification outcome.
    pub slack_notification_status: NotificationStatus,

    /// Request identifier for display and log correlation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,

    /// Typed sections, so clients need not parse `raw_report` back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<StructuredReport>,

    /// Set when the agent failed and `agent_analysis` is a placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,

    /// Connectors that degraded for this request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_errors: Vec<SourceFailure>,
}

impl ReportResponse {
    /// Returns true if `agent_analysis` holds a real analysis.
    pub fn has_analysis(&self) -> bool {
        self.analysis_error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(
            NotificationStatus::success("posted to C1").to_string(),
            "success: posted to C1"
        );
        assert_eq!(
            NotificationStatus::failed("Slack API error: channel_not_found").to_string(),
            "failed: Slack API error: channel_not_found"
        );
        assert_eq!(
            NotificationStatus::skipped("no analysis to send").to_string(),
            "skipped: no analysis to send"
        );
    }

    #[test]
    fn test_status_parses_known_prefixes() {
        let status = NotificationStatus::from("failed: invalid_auth".to_string());
        assert!(status.is_failed());
        assert_eq!(status, NotificationStatus::failed("invalid_auth"));

        let status = NotificationStatus::from("Notification skipped or failed.".to_string());
        assert_eq!(
            status,
            NotificationStatus::Other("Notification skipped or failed.".to_string())
        );
    }

    #[test]
    fn test_response_wire_format() {
        let response = ReportResponse {
            raw_report: "**Trello Board Status:**".into(),
            agent_analysis: "All good".into(),
            slack_notification_status: NotificationStatus::skipped("no analysis to send"),
            request_id: Some(RequestId::from("0badcafe")),
            sections: None,
            analysis_error: None,
            source_errors: Vec::new(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["slack_notification_status"], "skipped: no analysis to send");
        assert_eq!(json["request_id"], "0badcafe");
        assert!(json.get("sections").is_none());
        assert!(json.get("source_errors").is_none());
        assert!(response.has_analysis());
    }

    #[test]
    fn test_response_accepts_minimal_payload() {
        let json = r#"{
            "raw_report": "r",
            "agent_analysis": "a",
            "slack_notification_status": "success: ok"
        }"#;
        let response: ReportResponse = serde_json::from_str(json).unwrap();
        assert!(response.slack_notification_status.is_success());
        assert!(response.request_id.is_none());
        assert!(response.source_errors.is_empty());
    }
}
