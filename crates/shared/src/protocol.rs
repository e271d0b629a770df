use serde::{Deserialize, Serialize};

/// Success body of both account-recovery endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JSON body of `POST api/auth/restore_account_by_text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreByTextRequest {
    pub email: String,
    pub recovery_code: String,
}

/// Body of `GET /version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

/// Outcome reported by the label-print endpoint. `status` is `"success"`
/// with the transport `method` used, or `"error"` with a `detail`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintReport {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PrintReport {
    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}
