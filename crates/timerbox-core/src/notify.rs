//! User-facing notification contract

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, "Error", message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, "Success", message)
    }

    /// One-shot alert for a timer that reached zero
    pub fn timer_completed(title: &str) -> Self {
        Self::new(
            NotificationLevel::Info,
            "Timer finished",
            format!("\"{}\" is done", title),
        )
    }
}

/// Receives notifications. Callers never depend on the outcome.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}
