//! Command handlers for CLI subcommands.

use std::time::Duration;

use reporter_api::{serve, ApiConfig, AppState, ReportPipeline};
use reporter_core::{DashboardView, Settings};
use reporter_models::{ReportResponse, RequestId};
use tracing::{error, info};

use crate::cli::Commands;
use crate::gmail_auth;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Client-side timeout for `view`; longer than the server's report deadline.
const VIEW_TIMEOUT: Duration = Duration::from_secs(180);

/// Execute a CLI command.
pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Serve { host, port } => cmd_serve(host, port).await,
        Commands::Report { json } => cmd_report(json).await,
        Commands::View { url, token } => cmd_view(&url, token.as_deref()).await,
        Commands::GmailAuth {
            port,
            credentials,
            token,
        } => gmail_auth::run(port, &credentials, &token).await,
    }
}

async fn cmd_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let (mut config, pipeline) = match Settings::from_env() {
        Ok(settings) => {
            settings.warn_missing_gmail_files();
            let config = ApiConfig::from_settings(&settings.server);
            let pipeline = ReportPipeline::from_settings(&settings).map_err(|e| e.to_string());
            (config, pipeline)
        }
        Err(e) => (
            ApiConfig::default(),
            Err(format!("configuration error: {}", e)),
        ),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let state = match pipeline {
        Ok(pipeline) => {
            info!(timeout_secs = pipeline.timeout().as_secs(), "Report pipeline ready");
            AppState::new(config.clone(), pipeline)
        }
        Err(reason) => {
            error!(reason = %reason, "Report pipeline unavailable; /api/v1/report will return 503");
            AppState::unavailable(config.clone(), reason)
        }
    };

    serve(config, state).await?;
    Ok(())
}

async fn cmd_report(json: bool) -> Result<()> {
    let settings = Settings::from_env()?;
    settings.warn_missing_gmail_files();
    let pipeline = ReportPipeline::from_settings(&settings)?;

    let response = pipeline.run(&RequestId::new()).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", DashboardView::from_response(&response).render());
    }
    Ok(())
}

async fn cmd_view(url: &str, token: Option<&str>) -> Result<()> {
    let client = reqwest::Client::builder().timeout(VIEW_TIMEOUT).build()?;
    let response = fetch_report(&client, url, token).await?;
    println!("{}", DashboardView::from_response(&response).render());
    Ok(())
}

/// Calls `GET /api/v1/report` on a running server.
pub async fn fetch_report(
    client: &reqwest::Client,
    base_url: &str,
    token: Option<&str>,
) -> Result<ReportResponse> {
    let url = format!("{}/api/v1/report", base_url.trim_end_matches('/'));
    let mut request = client.get(&url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["detail"].as_str().map(String::from))
            .unwrap_or(body);
        return Err(format!("server returned {}: {}", status.as_u16(), detail).into());
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/report"))
            .and(header("Authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "raw_report": "**Trello Board Status:**\nTotal Cards: 0",
                "agent_analysis": "quiet week",
                "slack_notification_status": "success: message posted to C1",
                "request_id": "abcd1234"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let response = fetch_report(&client, &format!("{}/", server.uri()), Some("s3cret"))
            .await
            .unwrap();
        assert_eq!(response.agent_analysis, "quiet week");
        assert!(response.slack_notification_status.is_success());
        assert!(response.sections.is_none());
    }

    #[tokio::test]
    async fn test_fetch_report_surfaces_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "detail": "service unavailable: settings not loaded"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_report(&client, &server.uri(), None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "server returned 503: service unavailable: settings not loaded"
        );
    }
}
