//! Slack channel connector.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reporter_core::config::SlackSettings;
use reporter_core::text::{preview, PREVIEW_CHARS};
use reporter_core::KeywordTagger;
use reporter_models::{ReportSection, SectionKind};
use reporter_slack::{HistoryMessage, SlackClient};
use tracing::{debug, info, warn};

use crate::error::{Result, SourceError};
use crate::SourceConnector;

const SECTION: SectionKind = SectionKind::Slack;

const SYSTEM_SUBTYPES: &[&str] = &["channel_join", "channel_leave", "group_join", "group_leave"];

const NOISE_PHRASES: &[&str] = &[
    "has joined the channel",
    "has left the channel",
    "added an integration",
];

/// A kept message with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub user: String,
    pub text: String,
}

/// Reads recent human messages from one channel.
pub struct SlackConnector {
    client: SlackClient,
    channel_id: String,
    history_limit: u32,
    max_messages: usize,
    lookback_hours: Option<u32>,
    tagger: KeywordTagger,
}

impl SlackConnector {
    /// Creates a connector from settings.
    pub fn new(settings: &SlackSettings) -> Result<Self> {
        let client = SlackClient::new(settings.bot_token.clone())?;
        Self::with_client(client, settings)
    }

    /// Creates a connector around an existing client.
    pub fn with_client(client: SlackClient, settings: &SlackSettings) -> Result<Self> {
        let tagger = match &settings.blocker_keywords {
            Some(keywords) => KeywordTagger::new()
                .with_blocker_keywords(keywords)
                .map_err(|e| SourceError::Config {
                    section: SECTION,
                    detail: format!("invalid SLACK_BLOCKER_KEYWORDS: {}", e),
                })?,
            None => KeywordTagger::new(),
        };

        Ok(Self {
            client,
            channel_id: settings.channel_id.clone(),
            history_limit: settings.history_limit,
            max_messages: settings.max_messages,
            lookback_hours: settings.lookback_hours,
            tagger,
        })
    }

    /// Replaces the tagger.
    pub fn with_tagger(mut self, tagger: KeywordTagger) -> Self {
        self.tagger = tagger;
        self
    }

    /// Fetches, filters and resolves recent messages, newest first.
    pub async fn fetch_messages(&self) -> Result<Vec<ChannelMessage>> {
        let bot_user_id = match self.client.auth_test().await {
            Ok(identity) => identity.user_id,
            Err(e) => {
                warn!(error = %e, "Could not determine bot user id via auth.test");
                None
            }
        };

        let oldest = self.lookback_hours.and_then(|hours| {
            let start = lookback_start(Utc::now(), hours);
            if start.is_none() {
                warn!(hours, "Slack lookback window out of range, reading without a cutoff");
            }
            start
        });
        let history = self
            .client
            .conversations_history(&self.channel_id, self.history_limit, oldest)
            .await?;
        debug!(channel = %self.channel_id, raw = history.len(), "Fetched Slack history");

        let kept: Vec<&HistoryMessage> = history
            .iter()
            .filter(|msg| is_relevant(msg, bot_user_id.as_deref()))
            .take(self.max_messages)
            .collect();

        let mut names: HashMap<String, String> = HashMap::new();
        let mut messages = Vec::with_capacity(kept.len());
        for msg in kept {
            let (Some(user_id), Some(text)) = (msg.user.as_deref(), msg.text.as_deref()) else {
                continue;
            };
            let user = match names.get(user_id) {
                Some(name) => name.clone(),
                None => {
                    let name = match self.client.user_name(user_id).await {
                        Ok(name) => name,
                        Err(e) => {
                            warn!(user = user_id, error = %e, "Failed to resolve Slack user name");
                            user_id.to_string()
                        }
                    };
                    names.insert(user_id.to_string(), name.clone());
                    name
                }
            };
            messages.push(ChannelMessage {
                user,
                text: text.to_string(),
            });
        }
        Ok(messages)
    }

    /// Renders the Slack section for already-resolved messages.
    pub fn render(&self, messages: &[ChannelMessage]) -> ReportSection {
        render_messages(messages, &self.tagger)
    }
}

#[async_trait]
impl SourceConnector for SlackConnector {
    fn kind(&self) -> SectionKind {
        SECTION
    }

    async fn fetch_section(&self) -> Result<ReportSection> {
        let messages = self.fetch_messages().await?;
        info!(channel = %self.channel_id, count = messages.len(), "Slack section ready");
        Ok(self.render(&messages))
    }
}

/// Returns the Slack timestamp `hours` before `now`, or `None` when that
/// instant is outside the representable date range.
pub fn lookback_start(now: DateTime<Utc>, hours: u32) -> Option<i64> {
    now.checked_sub_signed(Duration::seconds(i64::from(hours) * 3600))
        .map(|start| start.timestamp())
}

/// Returns true for messages written by a person, excluding the bot itself
/// and join/leave notices.
pub fn is_relevant(msg: &HistoryMessage, bot_user_id: Option<&str>) -> bool {
    let (Some(user), Some(text)) = (msg.user.as_deref(), msg.text.as_deref()) else {
        return false;
    };
    if text.trim().is_empty() || msg.is_bot() {
        return false;
    }
    if bot_user_id == Some(user) {
        return false;
    }
    if msg
        .subtype
        .as_deref()
        .is_some_and(|s| SYSTEM_SUBTYPES.contains(&s))
    {
        return false;
    }
    !NOISE_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Renders one line per message, tagged by `tagger`.
pub fn render_messages(messages: &[ChannelMessage], tagger: &KeywordTagger) -> ReportSection {
    let mut section = ReportSection::new(SECTION);
    if messages.is_empty() {
        section.push_line("  _(No relevant recent messages found)_");
        return section.with_count(0);
    }

    for msg in messages {
        let tag = tagger
            .tag(&msg.text)
            .map(|t| format!("{} ", t))
            .unwrap_or_default();
        section.push_line(format!(
            "- {}**{}**: {}",
            tag,
            msg.user,
            preview(&msg.text, PREVIEW_CHARS)
        ));
    }
    section.with_count(messages.len())
}
