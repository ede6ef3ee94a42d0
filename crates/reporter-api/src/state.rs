//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::pipeline::ReportPipeline;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Report pipeline; `None` when settings failed to load.
    pub pipeline: Option<Arc<ReportPipeline>>,
    /// Why the pipeline is missing, surfaced in 503 responses.
    pub unavailable_reason: Option<String>,
}

impl AppState {
    /// Creates state with a working pipeline.
    pub fn new(config: ApiConfig, pipeline: ReportPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Some(Arc::new(pipeline)),
            unavailable_reason: None,
        }
    }

    /// Creates state for a server whose settings could not be loaded.
    ///
    /// Health and root still answer; report requests get 503.
    pub fn unavailable(config: ApiConfig, reason: impl Into<String>) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: None,
            unavailable_reason: Some(reason.into()),
        }
    }
}
