//! One report request: fetch, assemble, analyze, notify.
//!
//! Connector failures degrade their own section and never fail the request.
//! The agent fails closed: on error the response carries an explicit
//! placeholder and nothing is posted to Slack. A single deadline bounds the
//! connectors and the agent call.

use std::sync::Arc;
use std::time::Duration;

use reporter_agent::{AnalysisAgent, ChatClient, ModelConfig, Summarizer};
use reporter_core::{build_structured, degraded_section, render_raw_report, Settings};
use reporter_models::{
    NotificationStatus, ReportResponse, ReportSection, RequestId, SourceFailure,
};
use reporter_notify::{Notifier, SlackNotifier};
use reporter_sources::{
    GmailConnector, SlackConnector, SourceConnector, SourceError, TrelloConnector,
};
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn, Instrument};

use crate::config::DEFAULT_REPORT_TIMEOUT;
use crate::error::Result;

/// Status reported when the agent produced no analysis.
pub const NO_ANALYSIS: &str = "no analysis to send";

/// Connectors, agent and notifier for one deployment.
#[derive(Clone)]
pub struct ReportPipeline {
    trello: Arc<dyn SourceConnector>,
    gmail: Arc<dyn SourceConnector>,
    slack: Arc<dyn SourceConnector>,
    agent: Arc<dyn Summarizer>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl std::fmt::Debug for ReportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ReportPipeline {
    /// Assembles a pipeline from its parts, with the default deadline.
    pub fn new(
        trello: Arc<dyn SourceConnector>,
        gmail: Arc<dyn SourceConnector>,
        slack: Arc<dyn SourceConnector>,
        agent: Arc<dyn Summarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            trello,
            gmail,
            slack,
            agent,
            notifier,
            timeout: DEFAULT_REPORT_TIMEOUT,
        }
    }

    /// Builds the production pipeline from loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let trello = TrelloConnector::new(settings.trello.clone())?;
        let gmail = GmailConnector::new(settings.gmail.clone())?;
        let slack = SlackConnector::new(&settings.slack)?;

        let client = ChatClient::new(settings.llm.api_key.clone())?
            .with_api_url(settings.llm.api_url.clone());
        let agent = AnalysisAgent::new(client, ModelConfig::new(settings.llm.model.clone()));
        let notifier =
            SlackNotifier::new(&settings.slack.bot_token, settings.slack.channel_id.clone());

        Ok(Self::new(
            Arc::new(trello),
            Arc::new(gmail),
            Arc::new(slack),
            Arc::new(agent),
            Arc::new(notifier),
        )
        .with_timeout(settings.report_timeout))
    }

    /// Sets the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one report request.
    pub async fn run(&self, request_id: &RequestId) -> ReportResponse {
        let span = tracing::info_span!("report", request_id = %request_id);
        self.run_inner(request_id).instrument(span).await
    }

    async fn run_inner(&self, request_id: &RequestId) -> ReportResponse {
        let deadline = Instant::now() + self.timeout;
        info!(timeout_secs = self.timeout.as_secs(), "Report request started");

        let (trello, email, slack) = tokio::join!(
            fetch(self.trello.as_ref(), deadline),
            fetch(self.gmail.as_ref(), deadline),
            fetch(self.slack.as_ref(), deadline),
        );

        let mut source_errors = Vec::new();
        let mut take = |(section, failure): (ReportSection, Option<SourceFailure>)| {
            source_errors.extend(failure);
            section
        };
        let structured = build_structured(take(trello), take(email), take(slack));
        let raw_report = render_raw_report(&structured);

        let analysis = match timeout_at(deadline, self.agent.summarize(&raw_report)).await {
            Ok(Ok(analysis)) => Ok(analysis),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "analysis timed out after {}s",
                self.timeout.as_secs()
            )),
        };

        let (agent_analysis, analysis_error, status) = match analysis {
            Ok(analysis) => {
                let status = self.notifier.notify(&analysis, request_id).await;
                (analysis, None, status)
            }
            Err(e) => {
                error!(error = %e, "Agent analysis failed");
                (
                    analysis_placeholder(&e, request_id),
                    Some(e),
                    NotificationStatus::skipped(NO_ANALYSIS),
                )
            }
        };

        info!(
            degraded = source_errors.len(),
            notification = %status,
            "Report request finished"
        );

        ReportResponse {
            raw_report,
            agent_analysis,
            slack_notification_status: status,
            request_id: Some(request_id.clone()),
            sections: Some(structured),
            analysis_error,
            source_errors,
        }
    }
}

/// Text returned in place of an analysis when the agent failed.
pub fn analysis_placeholder(error: &str, request_id: &RequestId) -> String {
    format!(
        "Error during agent analysis: {}. (Req ID: {})",
        error, request_id
    )
}

async fn fetch(
    connector: &dyn SourceConnector,
    deadline: Instant,
) -> (ReportSection, Option<SourceFailure>) {
    let kind = connector.kind();
    let err = match timeout_at(deadline, connector.fetch_section()).await {
        Ok(Ok(section)) => return (section, None),
        Ok(Err(e)) => e,
        Err(_) => SourceError::Timeout { section: kind },
    };

    warn!(source = kind.source_name(), error = %err, "Source degraded");
    let detail = err.to_string();
    let line_detail = detail
        .strip_prefix(kind.vendor())
        .map(str::trim_start)
        .unwrap_or(&detail);
    let section = degraded_section(kind, line_detail);
    (
        section,
        Some(SourceFailure {
            source: kind,
            detail,
        }),
    )
}
