//! Service info handler.

use axum::Json;
use reporter_core::config::PROJECT_NAME;

use crate::router::API_PREFIX;
use crate::types::RootResponse;

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to the {}", PROJECT_NAME),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: format!("{}/report", API_PREFIX),
    })
}
