//! Gmail connector.
//!
//! Lists unread messages matching a query, reads each one, optionally clears
//! their UNREAD label and renders one three-line entry per email.

use async_trait::async_trait;
use chrono::Utc;
use reporter_core::config::GmailSettings;
use reporter_core::text::{collapse_whitespace, preview, PREVIEW_CHARS};
use reporter_models::{ReportSection, SectionKind};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{Result, SourceError};
use crate::{http_client, SourceConnector};

pub mod auth;
pub mod message;

pub use auth::{AuthorizedUser, ClientSecrets, GMAIL_SCOPE};
pub use message::Message;

use message::MessageList;

/// Gmail REST base URL for the authenticated user.
pub const GMAIL_API_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

const SECTION: SectionKind = SectionKind::Email;

/// One email as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSummary {
    pub id: String,
    pub sender: String,
    pub subject: String,
    /// Body text before truncation.
    pub body: String,
}

impl From<&Message> for EmailSummary {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id.clone(),
            sender: msg.sender(),
            subject: msg.subject(),
            body: msg.body_text(),
        }
    }
}

/// Reads labeled unread mail through the Gmail REST API.
pub struct GmailConnector {
    client: reqwest::Client,
    settings: GmailSettings,
    api_base: String,
}

impl GmailConnector {
    /// Creates a connector for the public Gmail API.
    pub fn new(settings: GmailSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(SECTION)?,
            settings,
            api_base: GMAIL_API_URL.to_string(),
        })
    }

    /// Overrides the Gmail API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Loads the token file, refreshing and rewriting it when the access token
    /// has expired.
    async fn access_token(&self) -> Result<String> {
        let mut user = AuthorizedUser::load(&self.settings.token_path).await?;
        if let Some(token) = user.valid_token(Utc::now()) {
            return Ok(token.to_string());
        }

        if user.client_id.is_none() {
            match ClientSecrets::load(&self.settings.credentials_path).await {
                Ok(secrets) => user.fill_client(&secrets),
                Err(e) => warn!(error = %e, "Cannot read Gmail client credentials"),
            }
        }
        user.refresh(&self.client).await?;
        if let Err(e) = user.save(&self.settings.token_path).await {
            warn!(error = %e, "Failed to persist refreshed Gmail token");
        }
        user.token
            .ok_or_else(|| SourceError::Auth {
                section: SECTION,
                detail: "token refresh returned no access token".to_string(),
            })
    }

    /// Fetches matching messages and marks them read when configured to.
    ///
    /// A message that cannot be fetched is logged and skipped. Failing to
    /// mark messages read is logged and does not fail the fetch.
    pub async fn fetch_emails(&self) -> Result<Vec<EmailSummary>> {
        let token = self.access_token().await?;

        let list: MessageList = self
            .get(
                &token,
                "messages",
                &[
                    ("q", self.settings.query.clone()),
                    ("maxResults", self.settings.max_results.to_string()),
                ],
            )
            .await?;
        info!(query = %self.settings.query, count = list.messages.len(), "Found Gmail messages");

        let mut emails = Vec::with_capacity(list.messages.len());
        for entry in &list.messages {
            match self
                .get::<Message>(
                    &token,
                    &format!("messages/{}", entry.id),
                    &[("format", "full".to_string())],
                )
                .await
            {
                Ok(msg) => emails.push(EmailSummary::from(&msg)),
                Err(e) => {
                    warn!(message_id = %entry.id, error = %e, "Failed to fetch Gmail message")
                }
            }
        }

        if self.settings.mark_read && !emails.is_empty() {
            let ids: Vec<&str> = emails.iter().map(|e| e.id.as_str()).collect();
            match self.mark_read(&token, &ids).await {
                Ok(()) => debug!(count = ids.len(), "Marked Gmail messages read"),
                Err(e) => warn!(
                    error = %e,
                    "Failed to mark Gmail messages read (needs gmail.modify scope)"
                ),
            }
        }

        Ok(emails)
    }

    async fn mark_read(&self, token: &str, ids: &[&str]) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/messages/batchModify", self.api_base))
            .bearer_auth(token)
            .json(&json!({ "ids": ids, "removeLabelIds": ["UNREAD"] }))
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SECTION, e))?;
        if !response.status().is_success() {
            return Err(SourceError::from_response(SECTION, response).await);
        }
        Ok(())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(format!("{}/{}", self.api_base, path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SECTION, e))?;

        if !response.status().is_success() {
            return Err(SourceError::from_response(SECTION, response).await);
        }
        response
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(SECTION, e))
    }
}

#[async_trait]
impl SourceConnector for GmailConnector {
    fn kind(&self) -> SectionKind {
        SECTION
    }

    async fn fetch_section(&self) -> Result<ReportSection> {
        let emails = self.fetch_emails().await?;
        info!(count = emails.len(), "Gmail section ready");
        Ok(render_emails(&emails))
    }
}

/// Renders the email section.
pub fn render_emails(emails: &[EmailSummary]) -> ReportSection {
    let mut section = ReportSection::new(SECTION);
    if emails.is_empty() {
        section.push_line("  _(No new emails found with the label project-updates)_");
        return section.with_count(0);
    }

    for email in emails {
        section.push_line(format!("- **From:** {}", collapse_whitespace(&email.sender)));
        section.push_line(format!("  **Subject:** {}", collapse_whitespace(&email.subject)));
        section.push_line(format!("  **Preview:** {}", preview(&email.body, PREVIEW_CHARS)));
    }
    section.with_count(emails.len())
}
