//! Source connectors for the project status reporter.
//!
//! Each connector reads one vendor and returns a finished
//! [`ReportSection`]: header, body lines and counts. Connectors take their
//! settings at construction and hold no state between fetches.

use std::time::Duration;

use async_trait::async_trait;
use reporter_models::{ReportSection, SectionKind};

pub mod error;
pub mod gmail;
pub mod slack;
pub mod trello;

pub use error::{Result, SourceError};
pub use gmail::GmailConnector;
pub use slack::SlackConnector;
pub use trello::TrelloConnector;

/// Per-request timeout for vendor HTTP calls.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// A data source that renders one report section.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Section this connector produces.
    fn kind(&self) -> SectionKind;

    /// Fetches from the vendor and renders the section.
    async fn fetch_section(&self) -> Result<ReportSection>;
}

pub(crate) fn http_client(section: SectionKind) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| SourceError::Config {
            section,
            detail: format!("failed to create HTTP client: {}", e),
        })
}
