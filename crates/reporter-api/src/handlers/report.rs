//! Report handler.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use reporter_models::{ReportResponse, RequestId};
use tracing::{error, info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// GET /api/v1/report
///
/// Runs the whole pipeline. Source and agent failures are folded into the
/// response body; only auth, missing configuration and internal faults
/// produce an error status.
pub async fn get_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReportResponse>> {
    let request_id = RequestId::new();
    info!(request_id = %request_id, "Report requested");

    if let Some(expected) = state.config.api_token.as_deref() {
        check_bearer(&headers, expected).inspect_err(|e| {
            warn!(request_id = %request_id, error = %e, "Report request rejected");
        })?;
    }

    let Some(pipeline) = state.pipeline.clone() else {
        let reason = state
            .unavailable_reason
            .clone()
            .unwrap_or_else(|| "settings not loaded".to_string());
        error!(request_id = %request_id, reason = %reason, "Report pipeline unavailable");
        return Err(ApiError::ServiceUnavailable(reason));
    };

    let id = request_id.clone();
    let response = tokio::spawn(async move { pipeline.run(&id).await })
        .await
        .map_err(|e| {
            error!(request_id = %request_id, error = %e, "Report task failed");
            ApiError::Internal(format!(
                "report generation failed (Req ID: {})",
                request_id
            ))
        })?;

    Ok(Json(response))
}

fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<()> {
    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match provided {
        None => Err(ApiError::Unauthorized("missing bearer token".to_string())),
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(ApiError::Unauthorized("invalid bearer token".to_string())),
    }
}
