//! Google OAuth2 for Gmail.
//!
//! The token file uses Google's "authorized user" JSON layout, so files
//! written by other Google tooling load unchanged. Unknown keys are kept when
//! the file is rewritten after a refresh.

use std::path::Path;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reporter_models::SectionKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::error::{Result, SourceError};

/// Scope needed to read messages and clear the UNREAD label.
pub const GMAIL_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Google's OAuth2 consent endpoint.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

const SECTION: SectionKind = SectionKind::Email;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn auth_error(detail: impl Into<String>) -> SourceError {
    SourceError::Auth {
        section: SECTION,
        detail: detail.into(),
    }
}

/// Contents of `token.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// Current access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// RFC 3339 expiry of `token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizedUser {
    /// Reads a token file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            auth_error(format!(
                "cannot read token file {} ({}); run `status-reporter gmail-auth`",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| auth_error(format!("invalid token file {}: {}", path.display(), e)))
    }

    /// Writes the token file.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| SourceError::Config {
            section: SECTION,
            detail: e.to_string(),
        })?;
        tokio::fs::write(path, json).await.map_err(|e| SourceError::Config {
            section: SECTION,
            detail: format!("cannot write {}: {}", path.display(), e),
        })
    }

    /// Returns the access token if it is present and not about to expire.
    ///
    /// A token without an expiry is taken as valid.
    pub fn valid_token(&self, now: DateTime<Utc>) -> Option<&str> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        let cutoff = now + Duration::seconds(EXPIRY_MARGIN_SECS);
        match self.expiry.as_deref().map(DateTime::parse_from_rfc3339) {
            None => Some(token),
            Some(Ok(expiry)) if expiry.with_timezone(&Utc) > cutoff => Some(token),
            Some(_) => None,
        }
    }

    /// Fills client id and secret from `secrets` where missing.
    pub fn fill_client(&mut self, secrets: &ClientSecrets) {
        if self.client_id.is_none() {
            self.client_id = Some(secrets.client_id.clone());
        }
        if self.client_secret.is_none() {
            self.client_secret = Some(secrets.client_secret.clone());
        }
        if self.token_uri.is_none() {
            self.token_uri = Some(secrets.token_uri.clone());
        }
    }

    fn apply(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.token = Some(response.access_token);
        if let Some(refresh) = response.refresh_token {
            self.refresh_token = Some(refresh);
        }
        self.expiry = response
            .expires_in
            .and_then(|secs| u32::try_from(secs).ok())
            .and_then(|secs| now.checked_add_signed(Duration::seconds(i64::from(secs))))
            .map(|expiry| expiry.to_rfc3339_opts(SecondsFormat::Micros, true));
    }

    /// Exchanges the refresh token for a new access token.
    pub async fn refresh(&mut self, client: &reqwest::Client) -> Result<()> {
        let refresh_token = self
            .refresh_token
            .clone()
            .ok_or_else(|| {
                auth_error("token file has no refresh_token; run `status-reporter gmail-auth`")
            })?;
        let client_id = self
            .client_id
            .clone()
            .ok_or_else(|| auth_error("token file has no client_id"))?;
        let client_secret = self.client_secret.clone().unwrap_or_default();
        let token_uri = self
            .token_uri
            .clone()
            .unwrap_or_else(|| GOOGLE_TOKEN_URI.to_string());

        debug!(token_uri = %token_uri, "Refreshing Gmail access token");
        let response = post_token(
            client,
            &token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ],
        )
        .await?;
        self.apply(response, Utc::now());
        info!("Gmail access token refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

async fn post_token(
    client: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| SourceError::from_reqwest(SECTION, e))?;

    let status = response.status();
    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or_default();
        let code = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("token_request_failed");
        return Err(auth_error(format!("token endpoint returned {}: {}", status.as_u16(), code)));
    }

    response
        .json()
        .await
        .map_err(|e| SourceError::from_reqwest(SECTION, e))
}

/// OAuth client from `credentials.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parses a credentials file of the `installed` or `web` kind.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(raw).map_err(|e| SourceError::Config {
            section: SECTION,
            detail: format!("invalid credentials file: {}", e),
        })?;
        file.installed.or(file.web).ok_or_else(|| SourceError::Config {
            section: SECTION,
            detail: "credentials file has neither an `installed` nor a `web` client".to_string(),
        })
    }

    /// Reads a credentials file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| SourceError::Config {
            section: SECTION,
            detail: format!("cannot read credentials file {}: {}", path.display(), e),
        })?;
        Self::from_json(&raw)
    }

    /// Consent URL for the installed-app flow.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", GMAIL_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| SourceError::Config {
            section: SECTION,
            detail: format!("invalid auth_uri {}: {}", self.auth_uri, e),
        })
    }

    /// Exchanges an authorization code for a token file.
    pub async fn exchange_code(
        &self,
        client: &reqwest::Client,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AuthorizedUser> {
        let response = post_token(
            client,
            &self.token_uri,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
            ],
        )
        .await?;

        let mut user = AuthorizedUser {
            scopes: vec![GMAIL_SCOPE.to_string()],
            ..Default::default()
        };
        user.fill_client(self);
        user.apply(response, Utc::now());
        if user.refresh_token.is_none() {
            return Err(auth_error("Google did not return a refresh token"));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_token_window() {
        let mut user = AuthorizedUser {
            token: Some("ya29".into()),
            expiry: Some("2024-05-01T13:00:00.000000Z".into()),
            ..Default::default()
        };
        assert_eq!(user.valid_token(now()), Some("ya29"));

        user.expiry = Some("2024-05-01T12:00:30Z".into());
        assert_eq!(user.valid_token(now()), None);

        user.expiry = None;
        assert_eq!(user.valid_token(now()), Some("ya29"));

        user.token = None;
        assert_eq!(user.valid_token(now()), None);
    }

    #[test]
    fn test_apply_ignores_unusable_lifetime() {
        let mut user = AuthorizedUser::default();
        user.apply(
            TokenResponse {
                access_token: "ya29.a".into(),
                expires_in: Some(3600),
                refresh_token: None,
            },
            now(),
        );
        assert_eq!(user.expiry.as_deref(), Some("2024-05-01T13:00:00.000000Z"));

        for lifetime in [i64::MAX, -5] {
            user.apply(
                TokenResponse {
                    access_token: "ya29.b".into(),
                    expires_in: Some(lifetime),
                    refresh_token: None,
                },
                now(),
            );
            assert_eq!(user.token.as_deref(), Some("ya29.b"));
            assert_eq!(user.expiry, None);
        }
    }

    #[test]
    fn test_unknown_keys_survive() {
        let raw = r#"{
            "token": "t",
            "refresh_token": "r",
            "client_id": "c",
            "universe_domain": "googleapis.com"
        }"#;
        let user: AuthorizedUser = serde_json::from_str(raw).unwrap();
        let out = serde_json::to_value(&user).unwrap();
        assert_eq!(out["universe_domain"], "googleapis.com");
        assert_eq!(out["refresh_token"], "r");
    }

    #[test]
    fn test_client_secrets_kinds() {
        let installed = ClientSecrets::from_json(
            r#"{"installed": {
                "client_id": "id1",
                "client_secret": "s1",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap();
        assert_eq!(installed.client_id, "id1");
        assert_eq!(installed.token_uri, GOOGLE_TOKEN_URI);

        let web = ClientSecrets::from_json(r#"{"web":{"client_id":"id2"}}"#).unwrap();
        assert_eq!(web.client_id, "id2");

        assert!(ClientSecrets::from_json(r#"{"other":{}}"#).is_err());
    }

    #[test]
    fn test_authorization_url() {
        let secrets = ClientSecrets::from_json(r#"{"installed":{"client_id":"id1"}}"#).unwrap();
        let url = secrets
            .authorization_url("http://127.0.0.1:8085/", "xyz")
            .unwrap();
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("scope".into(), GMAIL_SCOPE.into())));
        assert!(query.contains(&("access_type".into(), "offline".into())));
        assert!(query.contains(&("state".into(), "xyz".into())));
    }

    #[tokio::test]
    async fn test_refresh_updates_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh", "expires_in": 3599, "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let mut user = AuthorizedUser {
            token: Some("stale".into()),
            refresh_token: Some("r1".into()),
            client_id: Some("cid".into()),
            client_secret: Some("secret".into()),
            token_uri: Some(format!("{}/token", server.uri())),
            ..Default::default()
        };
        user.refresh(&reqwest::Client::new()).await.unwrap();
        assert_eq!(user.token.as_deref(), Some("fresh"));
        assert_eq!(user.refresh_token.as_deref(), Some("r1"));
        assert!(user.valid_token(Utc::now()).is_some());
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let mut user = AuthorizedUser {
            refresh_token: Some("revoked".into()),
            client_id: Some("cid".into()),
            token_uri: Some(format!("{}/token", server.uri())),
            ..Default::default()
        };
        let err = user.refresh(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, SourceError::Auth { .. }));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AuthorizedUser::load(&dir.path().join("token.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gmail-auth"));
    }
}
