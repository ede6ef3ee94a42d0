//! Slack Block Kit types.

use serde::{Deserialize, Serialize};

/// Maximum length of a section block's text.
pub const SECTION_TEXT_LIMIT: usize = 3000;

/// Text object used inside blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    /// Slack mrkdwn text.
    Mrkdwn { text: String },
    /// Plain text.
    PlainText { text: String },
}

impl TextObject {
    /// Creates a mrkdwn text object.
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    /// Creates a plain text object.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    /// The text content.
    pub fn text(&self) -> &str {
        match self {
            Self::Mrkdwn { text } | Self::PlainText { text } => text,
        }
    }
}

/// Block Kit block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Main content block.
    Section { text: TextObject },
    /// Small secondary text.
    Context { elements: Vec<TextObject> },
    /// Horizontal rule.
    Divider {},
}

impl Block {
    /// Creates a mrkdwn section block.
    pub fn section(text: impl Into<String>) -> Self {
        Self::Section {
            text: TextObject::mrkdwn(text),
        }
    }

    /// Creates a context block with one mrkdwn element.
    pub fn context(text: impl Into<String>) -> Self {
        Self::Context {
            elements: vec![TextObject::mrkdwn(text)],
        }
    }
}
