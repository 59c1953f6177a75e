//! Notification policy: message formatting and the outbound transport seam.
//!
//! Formatting is pure and never fails; delivery goes through the [`Notifier`]
//! trait so the monitor stays ignorant of the chat transport.

pub mod format;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::{DestinationId, TickValue};

/// Errors arising while delivering a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The transport refused or failed to deliver the message.
    #[error("failed to deliver notification: {0}")]
    DeliveryFailed(String),
}

/// A formatted message ready for the transport to render and deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMessage {
    /// Headline of the message.
    pub title: String,
    /// Body text, pre-formatted.
    pub body: String,
}

impl TickMessage {
    /// The announcement dispatched when a new tick is detected.
    pub fn announcement(tick: &TickValue, now: DateTime<Utc>) -> Self {
        Self {
            title: "🚨 New Galaxy Tick Detected!".to_string(),
            body: format::format_tick_announcement(tick, now),
        }
    }
}

/// Delivers a [`TickMessage`] to a destination within the chat transport.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `message` to `destination`.
    async fn notify(
        &self,
        destination: DestinationId,
        message: &TickMessage,
    ) -> Result<(), NotificationError>;
}
