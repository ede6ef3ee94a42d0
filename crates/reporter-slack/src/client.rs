//! Slack Web API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::blocks::Block;
use crate::error::{Result, SlackError};
use crate::types::{AuthIdentity, HistoryMessage, HistoryPage, PostedMessage, UserInfo};

/// Slack Web API base URL.
pub const SLACK_API_URL: &str = "https://slack.com/api";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bot-token Slack Web API client.
#[derive(Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    /// Creates a client for the public Slack API.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SlackError::Config("Slack bot token is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| SlackError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token,
            base_url: SLACK_API_URL.to_string(),
        })
    }

    /// Points the client at another base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Calls `auth.test`.
    pub async fn auth_test(&self) -> Result<AuthIdentity> {
        self.post("auth.test", &json!({})).await
    }

    /// Calls `conversations.history`, newest first.
    ///
    /// `oldest` is a Slack timestamp (seconds since the epoch).
    pub async fn conversations_history(
        &self,
        channel: &str,
        limit: u32,
        oldest: Option<i64>,
    ) -> Result<Vec<HistoryMessage>> {
        let mut query = vec![
            ("channel", channel.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(oldest) = oldest {
            query.push(("oldest", oldest.to_string()));
        }

        let page: HistoryPage = self.get("conversations.history", &query).await?;
        debug!(channel, count = page.messages.len(), "Fetched Slack history");
        Ok(page.messages)
    }

    /// Resolves a user id to the user's real name, falling back to the handle.
    pub async fn user_name(&self, user_id: &str) -> Result<String> {
        let info: UserInfo = self
            .get("users.info", &[("user", user_id.to_string())])
            .await?;
        Ok(info
            .user
            .real_name
            .filter(|n| !n.is_empty())
            .or(info.user.name)
            .unwrap_or_else(|| user_id.to_string()))
    }

    /// Posts a message with Block Kit blocks; `text` is the notification fallback.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        blocks: &[Block],
    ) -> Result<PostedMessage> {
        let payload = json!({
            "channel": channel,
            "text": text,
            "blocks": blocks,
        });
        self.post("chat.postMessage", &payload).await
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        trace!(method, "Slack GET");
        let response = self
            .client
            .get(self.url(method))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        self.decode(method, response).await
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, payload: &Value) -> Result<T> {
        trace!(method, "Slack POST");
        let response = self
            .client
            .post(self.url(method))
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(payload)
            .send()
            .await?;
        self.decode(method, response).await
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        method: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(30);
            return Err(SlackError::RateLimited {
                method: method.to_string(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Http {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            let code = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error")
                .to_string();
            return Err(SlackError::Api {
                method: method.to_string(),
                code,
            });
        }

        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SlackClient {
        SlackClient::new("xoxb-test").unwrap().with_base_url(server.uri())
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(SlackClient::new("  "), Err(SlackError::Config(_))));
    }

    #[tokio::test]
    async fn test_auth_test() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .and(header("Authorization", "Bearer xoxb-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "user_id": "UBOT", "user": "reporter", "team_id": "T1"
            })))
            .mount(&server)
            .await;

        let identity = client_for(&server).await.auth_test().await.unwrap();
        assert_eq!(identity.user_id.as_deref(), Some("UBOT"));
    }

    #[tokio::test]
    async fn test_history_with_oldest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations.history"))
            .and(query_param("channel", "C1"))
            .and(query_param("limit", "20"))
            .and(query_param("oldest", "1700000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "messages": [
                    {"type": "message", "user": "U1", "text": "hello", "ts": "1700000001.000100"},
                    {"type": "message", "subtype": "bot_message", "bot_id": "B1", "text": "beep"}
                ]
            })))
            .mount(&server)
            .await;

        let messages = client_for(&server)
            .await
            .conversations_history("C1", 20, Some(1_700_000_000))
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].user.as_deref(), Some("U1"));
        assert!(messages[1].is_bot());
    }

    #[tokio::test]
    async fn test_api_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations.history"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": false, "error": "not_in_channel"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .conversations_history("C1", 5, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("not_in_channel"));
        assert!(err.to_string().contains("conversations.history"));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .post_message("C1", "hi", &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SlackError::RateLimited {
                retry_after_secs: 12,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.auth_test().await.unwrap_err();
        assert!(matches!(err, SlackError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_user_name_fallbacks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .and(query_param("user", "U1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "user": {"id": "U1", "name": "ann", "real_name": "Ann Lee"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .and(query_param("user", "U2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "user": {"id": "U2", "name": "bo", "real_name": ""}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.user_name("U1").await.unwrap(), "Ann Lee");
        assert_eq!(client.user_name("U2").await.unwrap(), "bo");
    }

    #[tokio::test]
    async fn test_post_message_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(serde_json::json!({
                "channel": "C1",
                "text": "fallback",
                "blocks": [{"type": "section", "text": {"type": "mrkdwn", "text": "*hi*"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true, "channel": "C1", "ts": "1700000002.000200"
            })))
            .mount(&server)
            .await;

        let posted = client_for(&server)
            .await
            .post_message("C1", "fallback", &[Block::section("*hi*")])
            .await
            .unwrap();
        assert_eq!(posted.ts.as_deref(), Some("1700000002.000200"));
    }
}
