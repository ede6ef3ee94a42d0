//! Process configuration.
//!
//! Credentials and identifiers are read once at startup into a [`Settings`]
//! value, which is then handed to each connector, the agent and the notifier.
//! Nothing reads the environment after that.
//!
//! # Environment Variables
//!
//! Required:
//! - `TRELLO_API_KEY`, `TRELLO_TOKEN`, `TRELLO_BOARD_ID`
//! - `SLACK_BOT_TOKEN`, `SLACK_CHANNEL_ID`
//! - `OPENROUTER_API_KEY`
//!
//! Optional (defaults in parentheses):
//! - `LLM_MODEL` (`google/gemini-flash-1.5`), `LLM_API_URL` (OpenRouter)
//! - `GMAIL_TOKEN_PATH` (`token.json`), `GMAIL_CREDENTIALS_PATH` (`credentials.json`)
//! - `GMAIL_QUERY` (`label:project-updates is:unread`), `GMAIL_MAX_RESULTS` (5),
//!   `GMAIL_MARK_READ` (true)
//! - `SLACK_HISTORY_LIMIT` (20), `SLACK_MAX_MESSAGES` (5), `SLACK_LOOKBACK_HOURS`,
//!   `SLACK_BLOCKER_KEYWORDS` (comma separated)
//! - `REPORT_TIMEOUT_SECS` (120), `REPORTER_API_TOKEN`
//! - `HOST` (`127.0.0.1`), `PORT` (8000), `CORS_ORIGINS` (`http://localhost:3000`)
//! - `LOG_LEVEL` (`info`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

/// Project name reported by the API.
pub const PROJECT_NAME: &str = "Project Status Reporter API";

/// Default Gmail search query.
pub const DEFAULT_GMAIL_QUERY: &str = "label:project-updates is:unread";

/// Default chat-completions endpoint.
pub const DEFAULT_LLM_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_LLM_MODEL: &str = "google/gemini-flash-1.5";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Trello credentials and board.
#[derive(Debug, Clone)]
pub struct TrelloSettings {
    pub api_key: String,
    pub token: String,
    pub board_id: String,
}

/// Gmail OAuth files and query.
#[derive(Debug, Clone)]
pub struct GmailSettings {
    /// Authorized-user token file written by `gmail-auth`.
    pub token_path: PathBuf,
    /// OAuth client credentials file downloaded from the Google console.
    pub credentials_path: PathBuf,
    pub query: String,
    pub max_results: u32,
    /// Remove the UNREAD label from fetched messages.
    pub mark_read: bool,
}

/// Slack bot credentials and history window.
#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub bot_token: String,
    pub channel_id: String,
    /// Messages requested from `conversations.history`.
    pub history_limit: u32,
    /// Messages kept after filtering.
    pub max_messages: usize,
    /// Only consider messages newer than this many hours.
    pub lookback_hours: Option<u32>,
    /// Replacement blocker keywords, if configured.
    pub blocker_keywords: Option<Vec<String>>,
}

/// Language model endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

/// HTTP server options.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Bearer token required on report requests, if set.
    pub api_token: Option<String>,
}

/// All process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub trello: TrelloSettings,
    pub gmail: GmailSettings,
    pub slack: SlackSettings,
    pub llm: LlmSettings,
    pub server: ServerSettings,
    /// Deadline applied to connectors and the agent call of one request.
    pub report_timeout: Duration,
    pub log_level: String,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(&lookup);

        let settings = Self {
            trello: TrelloSettings {
                api_key: env.required("TRELLO_API_KEY")?,
                token: env.required("TRELLO_TOKEN")?,
                board_id: env.required("TRELLO_BOARD_ID")?,
            },
            gmail: GmailSettings {
                token_path: env.path("GMAIL_TOKEN_PATH", "token.json"),
                credentials_path: env.path("GMAIL_CREDENTIALS_PATH", "credentials.json"),
                query: env.or("GMAIL_QUERY", DEFAULT_GMAIL_QUERY),
                max_results: env.parsed("GMAIL_MAX_RESULTS", 5)?,
                mark_read: env.flag("GMAIL_MARK_READ", true)?,
            },
            slack: SlackSettings {
                bot_token: env.required("SLACK_BOT_TOKEN")?,
                channel_id: env.required("SLACK_CHANNEL_ID")?,
                history_limit: env.parsed("SLACK_HISTORY_LIMIT", 20)?,
                max_messages: env.parsed("SLACK_MAX_MESSAGES", 5)?,
                lookback_hours: env.optional_parsed("SLACK_LOOKBACK_HOURS")?,
                blocker_keywords: env.list("SLACK_BLOCKER_KEYWORDS"),
            },
            llm: LlmSettings {
                api_key: env.required("OPENROUTER_API_KEY")?,
                api_url: env.or("LLM_API_URL", DEFAULT_LLM_API_URL),
                model: env.or("LLM_MODEL", DEFAULT_LLM_MODEL),
            },
            server: ServerSettings {
                host: env.or("HOST", "127.0.0.1"),
                port: env.parsed("PORT", 8000)?,
                cors_origins: env
                    .list("CORS_ORIGINS")
                    .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]),
                api_token: env.get("REPORTER_API_TOKEN"),
            },
            report_timeout: Duration::from_secs(
                env.parsed("REPORT_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            ),
            log_level: env.or("LOG_LEVEL", "info").to_lowercase(),
        };

        info!(project = PROJECT_NAME, "Settings loaded");
        Ok(settings)
    }

    /// Logs a warning for each Gmail file that does not exist yet.
    pub fn warn_missing_gmail_files(&self) {
        if !self.gmail.credentials_path.exists() {
            warn!(
                path = %self.gmail.credentials_path.display(),
                "Gmail credentials file not found"
            );
        }
        if !self.gmail.token_path.exists() {
            warn!(
                path = %self.gmail.token_path.display(),
                "Gmail token file not found. Run `status-reporter gmail-auth`."
            );
        }
    }

    /// Returns the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Loads `.env.local` then `.env` from the working directory, if present.
///
/// Variables already set in the process environment take precedence.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
}

/// Loads an explicit env file.
pub fn load_env_file(path: &Path) -> std::result::Result<(), dotenvy::Error> {
    dotenvy::from_path(path)
}

struct Lookup<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Lookup<'_, F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn path(&self, key: &str, default: &str) -> PathBuf {
        PathBuf::from(self.or(key, default))
    }

    fn optional_parsed<T>(&self, key: &'static str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    key,
                    value,
                    reason: e.to_string(),
                }),
        }
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.optional_parsed(key)?.unwrap_or(default))
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool> {
        match self.get(key).map(|v| v.to_lowercase()) {
            None => Ok(default),
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
            Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
            Some(value) => Err(ConfigError::Invalid {
                key,
                value,
                reason: "expected a boolean".to_string(),
            }),
        }
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        let items: Vec<String> = self
            .get(key)?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        (!items.is_empty()).then_some(items)
    }
}
