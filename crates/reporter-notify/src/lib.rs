//! Slack notification of report analyses.
//!
//! A [`Notifier`] never fails the request: every problem is folded into a
//! `failed: ...` [`NotificationStatus`].

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reporter_core::text::truncate_chars;
use reporter_models::{NotificationStatus, RequestId};
use reporter_slack::blocks::SECTION_TEXT_LIMIT;
use reporter_slack::{Block, SlackClient, SlackError};
use thiserror::Error;
use tracing::{error, info, warn};

const TRUNCATION_MARKER: &str = "…";

/// Reasons a notification could not be delivered.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Token, channel or message text missing.
    #[error("missing token, channel, or message")]
    MissingInput,

    /// Slack rejected the post or could not be reached.
    #[error("Slack API error: {0}")]
    Slack(#[from] SlackError),
}

/// Delivers an analysis somewhere people will read it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Posts `analysis` and reports the outcome.
    async fn notify(&self, analysis: &str, request_id: &RequestId) -> NotificationStatus;
}

/// Posts analyses to one Slack channel.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: Option<SlackClient>,
    channel_id: String,
}

impl SlackNotifier {
    /// Creates a notifier. An empty token yields a notifier that always
    /// reports missing input.
    pub fn new(bot_token: &str, channel_id: impl Into<String>) -> Self {
        let client = match SlackClient::new(bot_token) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Slack notifier has no usable client");
                None
            }
        };
        Self {
            client,
            channel_id: channel_id.into(),
        }
    }

    /// Creates a notifier around an existing client.
    pub fn with_client(client: SlackClient, channel_id: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            channel_id: channel_id.into(),
        }
    }

    async fn post(&self, analysis: &str, date: NaiveDate) -> Result<String, NotifyError> {
        let client = self.client.as_ref().ok_or(NotifyError::MissingInput)?;
        if self.channel_id.trim().is_empty() || analysis.trim().is_empty() {
            return Err(NotifyError::MissingInput);
        }

        let posted = client
            .post_message(&self.channel_id, &fallback_text(date), &analysis_blocks(analysis, date))
            .await?;
        Ok(posted.ts.unwrap_or_else(|| "N/A".to_string()))
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, analysis: &str, request_id: &RequestId) -> NotificationStatus {
        let today = Local::now().date_naive();
        match self.post(analysis, today).await {
            Ok(ts) => {
                info!(
                    request_id = %request_id,
                    channel = %self.channel_id,
                    ts = %ts,
                    "Analysis posted to Slack"
                );
                NotificationStatus::success(format!("message posted to {}", self.channel_id))
            }
            Err(e) => {
                if let NotifyError::Slack(slack) = &e {
                    if slack.code() == Some("missing_scope") {
                        error!(
                            request_id = %request_id,
                            "Slack bot token lacks the chat:write scope"
                        );
                    }
                }
                error!(request_id = %request_id, error = %e, "Slack notification failed");
                NotificationStatus::failed(e.to_string())
            }
        }
    }
}

/// Notification fallback text.
pub fn fallback_text(date: NaiveDate) -> String {
    format!("Project Status Analysis ({})", date.format("%Y-%m-%d"))
}

/// Block Kit payload for an analysis: a quoted section and a date context line.
pub fn analysis_blocks(analysis: &str, date: NaiveDate) -> Vec<Block> {
    let day = date.format("%Y-%m-%d");
    let text = format!("📊 *Project Status Analysis - {}*\n>>> {}", day, analysis);
    vec![
        Block::section(truncate_chars(&text, SECTION_TEXT_LIMIT, TRUNCATION_MARKER)),
        Block::context(format!("Report generated on {}", day)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use reporter_slack::TextObject;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn section_text(block: &Block) -> &str {
        match block {
            Block::Section { text } => text.text(),
            other => panic!("expected section, got {:?}", other),
        }
    }

    #[test]
    fn test_blocks_layout() {
        let blocks = analysis_blocks("**1. Concise Summary:**\n\n- fine", date());
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            section_text(&blocks[0]),
            "📊 *Project Status Analysis - 2024-05-01*\n>>> **1. Concise Summary:**\n\n- fine"
        );
        assert_eq!(
            blocks[1],
            Block::Context {
                elements: vec![TextObject::mrkdwn("Report generated on 2024-05-01")]
            }
        );
        assert_eq!(fallback_text(date()), "Project Status Analysis (2024-05-01)");
    }

    #[test]
    fn test_long_analysis_truncated() {
        let blocks = analysis_blocks(&"a".repeat(5000), date());
        let text = section_text(&blocks[0]);
        assert_eq!(text.chars().count(), SECTION_TEXT_LIMIT);
        assert!(text.ends_with(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn test_missing_token() {
        let notifier = SlackNotifier::new("", "C1");
        let status = notifier.notify("analysis", &RequestId::from("r1")).await;
        assert_eq!(status.to_string(), "failed: missing token, channel, or message");
    }

    #[tokio::test]
    async fn test_missing_channel_and_text() {
        let client = SlackClient::new("xoxb-test").unwrap();
        let notifier = SlackNotifier::with_client(client.clone(), "");
        assert!(notifier.notify("analysis", &RequestId::from("r1")).await.is_failed());

        let notifier = SlackNotifier::with_client(client, "C1");
        let status = notifier.notify("  ", &RequestId::from("r1")).await;
        assert_eq!(status.to_string(), "failed: missing token, channel, or message");
    }

    #[tokio::test]
    async fn test_posts_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(serde_json::json!({"channel": "C1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "channel": "C1", "ts": "1714564800.000100"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SlackClient::new("xoxb-test").unwrap().with_base_url(server.uri());
        let notifier = SlackNotifier::with_client(client, "C1");
        let status = notifier.notify("all good", &RequestId::from("r1")).await;
        assert!(status.is_success());
        assert_eq!(status.to_string(), "success: message posted to C1");
    }

    #[tokio::test]
    async fn test_slack_error_becomes_failed_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"ok": false, "error": "missing_scope"}),
            ))
            .mount(&server)
            .await;

        let client = SlackClient::new("xoxb-test").unwrap().with_base_url(server.uri());
        let notifier = SlackNotifier::with_client(client, "C1");
        let status = notifier.notify("all good", &RequestId::from("r1")).await;
        assert!(status.is_failed());
        assert!(status.to_string().contains("missing_scope"));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failed_status() {
        let client = SlackClient::new("xoxb-test")
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let notifier = SlackNotifier::with_client(client, "C1");
        let status = notifier.notify("all good", &RequestId::from("r1")).await;
        assert!(status.is_failed());
    }
}
