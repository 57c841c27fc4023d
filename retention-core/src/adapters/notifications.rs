//! Notifier adapters

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info};

use crate::config::NotificationSettings;
use crate::domain::{Notification, NotificationVariant};
use crate::ports::Notifier;

/// Keeps the most recent notifications, oldest dropped first
#[derive(Debug)]
pub struct RecentNotifications {
    max_visible: usize,
    auto_hide: Option<Duration>,
    items: Mutex<VecDeque<Notification>>,
}

impl RecentNotifications {
    pub fn new(max_visible: usize) -> Self {
        Self {
            max_visible: max_visible.max(1),
            auto_hide: None,
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Toast behaviour: bounded, and each message hides after a while
    pub fn from_settings(settings: &NotificationSettings) -> Self {
        let auto_hide = i64::try_from(settings.auto_hide_ms)
            .ok()
            .map(Duration::milliseconds);
        Self {
            auto_hide,
            ..Self::new(settings.max_visible)
        }
    }

    /// Visible notifications, oldest first
    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Utc::now())
    }

    fn visible_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| match self.auto_hide {
                Some(hide) => now - n.created_at < hide,
                None => true,
            })
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for RecentNotifications {
    fn notify(&self, notification: Notification) {
        log_notification(&notification);
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.push_back(notification);
        while items.len() > self.max_visible {
            items.pop_front();
        }
    }
}

fn log_notification(notification: &Notification) {
    match notification.variant {
        NotificationVariant::Error => error!(text = %notification.message, "notification"),
        _ => info!(text = %notification.message, "notification"),
    }
}
