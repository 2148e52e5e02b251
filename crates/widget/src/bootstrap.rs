//! One-time HTTP exchange that authorizes the widget and opens a session.
//!
//! Two calls, in order: `GET /validate-domain` exchanges the embedding
//! page's hostname for an API key, then `POST /start-session` exchanges
//! the job context and API key for a session id. Neither call is retried;
//! a failure here is fatal for this activation attempt.

use crate::config::WidgetConfig;
use serde::Deserialize;
use tracing::info;

/// A bootstrap failure. The message is the server-provided `detail` when
/// the response body carried one, so the user sees what the backend said.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("{0}")]
    DomainValidation(String),
    #[error("{0}")]
    SessionStart(String),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A live screening session, created once per widget activation and
/// discarded when the socket closes.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    /// Human-readable position title, when the backend supplies one.
    pub position: Option<String>,
}

#[derive(Deserialize)]
struct ValidateDomainResponse {
    #[serde(rename = "apiKey")]
    api_key: String,
}

#[derive(Deserialize)]
struct StartSessionResponse {
    session_id: String,
    position: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Extracts the failure message from a non-success response body.
///
/// The backend reports failures as `{"detail": "..."}`; anything else
/// falls back to a generic message carrying the HTTP status.
fn failure_detail(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.detail,
        Err(_) => format!("Request failed with status {}", status.as_u16()),
    }
}

/// Validates the embedding domain and returns the API key for this host.
pub async fn validate_domain(
    http: &reqwest::Client,
    config: &WidgetConfig,
) -> Result<String, BootstrapError> {
    let url = format!("{}/validate-domain", config.api_base);
    let response = http
        .get(url)
        .query(&[("domain", config.domain.as_str())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BootstrapError::DomainValidation(failure_detail(
            status, &body,
        )));
    }

    let parsed: ValidateDomainResponse = response.json().await?;
    Ok(parsed.api_key)
}

/// Creates a new screening session for the configured job.
pub async fn start_session(
    http: &reqwest::Client,
    config: &WidgetConfig,
    api_key: &str,
) -> Result<Session, BootstrapError> {
    let url = format!("{}/start-session", config.api_base);
    let response = http
        .post(url)
        .query(&[
            ("job_type", config.job_id.as_str()),
            ("api_key", api_key),
            ("location", config.location.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BootstrapError::SessionStart(failure_detail(status, &body)));
    }

    let parsed: StartSessionResponse = response.json().await?;
    info!(session_id = %parsed.session_id, "Session created");
    Ok(Session {
        id: parsed.session_id,
        position: parsed.position,
    })
}
