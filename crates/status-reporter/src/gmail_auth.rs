//! One-time Gmail authorization.
//!
//! Prints the Google consent URL, waits for the redirect on a local callback
//! server, exchanges the code and writes the authorized-user token file that
//! the Gmail connector reads.

use std::path::Path;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use reporter_sources::gmail::ClientSecrets;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::commands::Result;

const SUCCESS_PAGE: &str =
    "<html><body><h3>Gmail access granted.</h3><p>You can close this tab.</p></body></html>";
const FAILURE_PAGE: &str = "<html><body><h3>Gmail authorization failed.</h3>\
                            <p>See the terminal for details.</p></body></html>";

/// How long to wait for the browser redirect.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub struct Callback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl Callback {
    /// Returns the authorization code, or why the callback is unusable.
    pub fn into_code(self, expected_state: &str) -> std::result::Result<String, String> {
        if let Some(error) = self.error {
            return Err(format!("authorization denied: {}", error));
        }
        if self.state.as_deref() != Some(expected_state) {
            return Err("state mismatch in OAuth callback".to_string());
        }
        self.code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| "OAuth callback carried no code".to_string())
    }
}

#[derive(Clone)]
struct CallbackState {
    expected_state: String,
    tx: mpsc::Sender<std::result::Result<String, String>>,
}

fn callback_router(
    expected_state: String,
    tx: mpsc::Sender<std::result::Result<String, String>>,
) -> Router {
    Router::new()
        .route("/", get(callback))
        .with_state(CallbackState { expected_state, tx })
}

async fn callback(
    State(state): State<CallbackState>,
    Query(params): Query<Callback>,
) -> Html<&'static str> {
    let outcome = params.into_code(&state.expected_state);
    let page = if outcome.is_ok() {
        SUCCESS_PAGE
    } else {
        FAILURE_PAGE
    };
    if state.tx.try_send(outcome).is_err() {
        warn!("Ignoring repeated OAuth callback");
    }
    Html(page)
}

/// Runs the installed-app flow and writes `token_path`.
pub async fn run(port: u16, credentials: &Path, token_path: &Path) -> Result<()> {
    let secrets = ClientSecrets::load(credentials).await?;
    let redirect_uri = format!("http://localhost:{}/", port);
    let expected_state = uuid::Uuid::new_v4().simple().to_string();
    let auth_url = secrets.authorization_url(&redirect_uri, &expected_state)?;

    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    println!("Open this URL in your browser to authorize Gmail access:\n\n{}\n", auth_url);
    info!(port, "Waiting for the OAuth redirect");

    let code = wait_for_code(listener, expected_state).await?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let user = secrets.exchange_code(&client, &code, &redirect_uri).await?;
    user.save(token_path).await?;

    println!("Token written to {}", token_path.display());
    Ok(())
}

async fn wait_for_code(listener: TcpListener, expected_state: String) -> Result<String> {
    let (tx, mut rx) = mpsc::channel(1);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, callback_router(expected_state, tx))
        .with_graceful_shutdown(async {
            let _ = stop_rx.await;
        });
    let handle = tokio::spawn(async move { server.await });

    let outcome = tokio::time::timeout(CALLBACK_TIMEOUT, rx.recv()).await;
    let _ = stop_tx.send(());
    if let Err(e) = handle.await {
        warn!(error = %e, "Callback server task failed");
    }

    match outcome {
        Err(_) => Err("timed out waiting for the OAuth redirect".into()),
        Ok(None) => Err("callback server stopped before a redirect arrived".into()),
        Ok(Some(Err(reason))) => Err(reason.into()),
        Ok(Some(Ok(code))) => Ok(code),
    }
}
