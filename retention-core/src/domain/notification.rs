//! Transient user notifications (toasts)

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Success,
    Error,
    Info,
}

/// A short-lived message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub variant: NotificationVariant,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(variant: NotificationVariant, message: impl Into<String>) -> Self {
        Self {
            variant,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationVariant::Info, message)
    }
}
