use reqwest::Client;
use shared::protocol::VersionInfo;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub mod events;
pub mod panel;
pub mod recovery;
pub mod session;

pub use events::{event_channel, ClientEvent, Notice, Severity};
pub use panel::{
    layout_for, DeviceSuggestion, PanelController, PanelPhase, ScanPreview, DEFAULT_SCANNER_PORT,
};
pub use recovery::{
    RecoveryField, RecoveryFile, RecoveryFlowController, RecoveryMethod, POST_RECOVERY_URL,
};
pub use session::{SessionContext, SessionStore};

/// Shown wherever the backend build version could not be fetched.
pub const VERSION_PLACEHOLDER: &str = "version unavailable";

/// Failure taxonomy for controller actions. Validation and missing-selection
/// failures never issue a request; API failures carry the backend's `detail`
/// verbatim; transport and decode failures collapse to a generic message at
/// the notification layer.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Validation(String),
    #[error("no device selected")]
    NoDeviceSelected,
    #[error("HTTP {status}: {detail}")]
    Api { status: u16, detail: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("session storage failed: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        ActionError::Transport(err.to_string())
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        ActionError::Storage(format!("{err:#}"))
    }
}

/// Validates the configured server URL once at controller construction and
/// strips the trailing slash so endpoint paths concatenate cleanly.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, ActionError> {
    let parsed = Url::parse(base_url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ActionError::Validation(format!(
            "server url must be http or https, got {}",
            parsed.scheme()
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Fetches the backend build version for display. Failures are non-fatal
/// and degrade to the fixed placeholder.
pub async fn fetch_build_version(http: &Client, base_url: &str) -> String {
    match try_fetch_version(http, base_url).await {
        Ok(version) => {
            info!(version = %version, "version: backend build");
            version
        }
        Err(err) => {
            warn!(error = %err, "version: fetch failed");
            VERSION_PLACEHOLDER.to_string()
        }
    }
}

async fn try_fetch_version(http: &Client, base_url: &str) -> Result<String, reqwest::Error> {
    let info: VersionInfo = http
        .get(format!("{}/version", base_url.trim_end_matches('/')))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(info.version)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
