//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Project Status Reporter - Trello, Gmail and Slack digests with LLM analysis
#[derive(Parser, Debug)]
#[command(name = "status-reporter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Extra env file loaded before `.env.local` and `.env`
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Host to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate one report and print it
    Report {
        /// Print the full JSON response instead of the dashboard
        #[arg(long)]
        json: bool,
    },

    /// Fetch a report from a running server and render the dashboard
    View {
        /// Base URL of the server
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        url: String,

        /// Bearer token for the report endpoint
        #[arg(long, env = "REPORTER_API_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Authorize Gmail access and write the token file
    GmailAuth {
        /// Local port for the OAuth redirect
        #[arg(short, long, default_value_t = 8085)]
        port: u16,

        /// OAuth client credentials file
        #[arg(long, env = "GMAIL_CREDENTIALS_PATH", default_value = "credentials.json")]
        credentials: PathBuf,

        /// Where to write the authorized-user token
        #[arg(long, env = "GMAIL_TOKEN_PATH", default_value = "token.json")]
        token: PathBuf,
    },
}

impl Cli {
    /// Log filter directive: `-v` flags win over `LOG_LEVEL`.
    pub fn log_filter(&self, log_level: Option<&str>) -> String {
        match self.verbose {
            0 => match log_level.map(|l| l.trim().to_lowercase()).as_deref() {
                None | Some("") => "info".to_string(),
                Some("warning") => "warn".to_string(),
                Some("critical") => "error".to_string(),
                Some(level) => level.to_string(),
            },
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
