//! API configuration.

use std::time::{Duration, Instant};

use reporter_core::config::ServerSettings;

/// Default allowed CORS origin (the dashboard dev server).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Default per-request deadline.
pub const DEFAULT_REPORT_TIMEOUT: Duration = Duration::from_secs(120);

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Bearer token required on report requests, if any.
    pub api_token: Option<String>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl ApiConfig {
    /// Creates a new API configuration with the given host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Builds the configuration from loaded server settings.
    pub fn from_settings(server: &ServerSettings) -> Self {
        Self::new(server.host.clone(), server.port)
            .with_cors_origins(server.cors_origins.clone())
            .with_api_token(server.api_token.clone())
    }

    /// Sets the CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Requires `Authorization: Bearer <token>` on report requests.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            api_token: None,
            start_time: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_default() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins, vec![DEFAULT_CORS_ORIGIN.to_string()]);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_api_config_bind_address() {
        let config = ApiConfig::new("0.0.0.0", 3001);
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
    }

    #[test]
    fn test_blank_token_disables_auth() {
        let config = ApiConfig::default().with_api_token(Some("  ".to_string()));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_from_settings() {
        let server = ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 9000,
            cors_origins: vec!["http://a.test".to_string()],
            api_token: Some("secret".to_string()),
        };
        let config = ApiConfig::from_settings(&server);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.cors_origins, vec!["http://a.test".to_string()]);
        assert_eq!(config.api_token.as_deref(), Some("secret"));
    }
}
