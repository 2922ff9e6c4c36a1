//! Port for delivering tour notifications.

use async_trait::async_trait;

use crate::domain::Notification;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification sinks.
    pub enum NotificationSinkError {
        /// The notification could not be handed to its transport.
        Delivery { message: String } => "notification delivery failed: {message}",
    }
}

/// Outbound channel for [`Notification`]s.
///
/// Callers treat failures as non-fatal: the tour mutation that produced the
/// notification has already been committed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotificationSinkError>;
}
