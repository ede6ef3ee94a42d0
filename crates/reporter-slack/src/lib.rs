//! Slack Web API client for the project status reporter.
//!
//! Covers the handful of methods the reporter needs:
//! - `auth.test` to learn the bot's own user id
//! - `conversations.history` to read recent channel messages
//! - `users.info` to resolve user ids to display names
//! - `chat.postMessage` with Block Kit blocks
//!
//! # Example
//!
//! ```no_run
//! use reporter_slack::SlackClient;
//!
//! # async fn run() -> reporter_slack::Result<()> {
//! let client = SlackClient::new("xoxb-...")?;
//! let messages = client.conversations_history("C0123", 20, None).await?;
//! println!("{} messages", messages.len());
//! # Ok(())
//! # }
//! ```

pub mod blocks;
pub mod client;
pub mod error;
pub mod types;

pub use blocks::{Block, TextObject};
pub use client::SlackClient;
pub use error::{Result, SlackError};
pub use types::{AuthIdentity, HistoryMessage, PostedMessage};
