//! Notification sink adapters.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::domain::Notification;
use crate::domain::ports::{NotificationSink, NotificationSinkError};

/// Writes each notification to the structured log.
///
/// Stands in for a mail or push transport; downstream log shipping picks the
/// events up by their `notification` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationSinkError> {
        for recipient in &notification.recipients {
            info!(
                target: "notification",
                kind = notification.kind.as_str(),
                tour_id = %notification.tour_id,
                tour_title = %notification.tour_title,
                actor = %notification.actor_id,
                %recipient,
                "notification queued"
            );
        }
        Ok(())
    }
}

/// Keeps delivered notifications in memory for inspection.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotificationSink {
    delivered: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|delivered| delivered.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationSinkError> {
        self.delivered
            .lock()
            .map_err(|_| NotificationSinkError::delivery("recording sink lock poisoned"))?
            .push(notification.clone());
        Ok(())
    }
}
