//! Notification port

use crate::domain::Notification;

/// Surface for transient user notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
