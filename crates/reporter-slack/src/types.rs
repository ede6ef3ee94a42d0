//! Response types for the Slack methods the reporter calls.

use serde::{Deserialize, Serialize};

/// Identity returned by `auth.test`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    /// Bot user id.
    pub user_id: Option<String>,
    /// Bot user name.
    #[serde(default)]
    pub user: Option<String>,
    /// Workspace id.
    #[serde(default)]
    pub team_id: Option<String>,
}

/// One message from `conversations.history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// Author user id (absent for some bot and system messages).
    #[serde(default)]
    pub user: Option<String>,
    /// Message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Message subtype (`bot_message`, `channel_join`, ...).
    #[serde(default)]
    pub subtype: Option<String>,
    /// Set when a bot integration posted the message.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Message timestamp.
    #[serde(default)]
    pub ts: Option<String>,
}

impl HistoryMessage {
    /// Returns true if the message was posted by a bot.
    pub fn is_bot(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryPage {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserInfo {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserProfile {
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Result of `chat.postMessage`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostedMessage {
    /// Channel the message landed in.
    #[serde(default)]
    pub channel: Option<String>,
    /// Timestamp of the new message.
    #[serde(default)]
    pub ts: Option<String>,
}
