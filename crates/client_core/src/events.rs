//! Structured notification channel the controllers emit on. The host decides
//! how notices are presented; the controllers only supply text and severity.

use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Pending,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Notice(Notice),
    /// The post-recovery navigation request, emitted after the fixed delay.
    RedirectRequested { url: String },
    /// The panel's scan preview was replaced; hosts re-read it.
    ScanPreviewUpdated,
}

pub fn event_channel() -> (
    broadcast::Sender<ClientEvent>,
    broadcast::Receiver<ClientEvent>,
) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
