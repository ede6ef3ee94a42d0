//! HTTP API for the project status reporter.
//!
//! - `GET /api/v1/report`: fetch all sources, analyze, notify, return the report
//! - `GET /api/v1/health`: liveness and uptime
//! - `GET /`: service info
//!
//! # Example
//!
//! ```ignore
//! use reporter_api::{serve, ApiConfig, AppState, ReportPipeline};
//! use reporter_core::Settings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let config = ApiConfig::from_settings(&settings.server);
//!     let state = AppState::new(config.clone(), ReportPipeline::from_settings(&settings)?);
//!
//!     serve(config, state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use pipeline::ReportPipeline;
pub use router::{create_router, serve};
pub use state::AppState;
