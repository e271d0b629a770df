use serde::{Deserialize, Serialize};

/// Structured error body the backend attaches to non-2xx responses. The
/// `detail` text is surfaced to the user verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
