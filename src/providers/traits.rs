//! This module defines the interface for fetching the current galaxy tick
//! from a remote feed.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::TickValue;

/// Custom error type for tick fetch operations.
///
/// Network-level problems (timeout, connection refused) are distinguished
/// from protocol-level ones (non-2xx status, malformed body) so callers can
/// log them apart, but both are handled the same way: skip this cycle.
#[derive(Debug, Error)]
pub enum TickSourceError {
    /// The request exceeded the configured deadline.
    #[error("tick fetch timed out")]
    Timeout,

    /// The request failed below the HTTP layer.
    #[error("network error fetching tick: {0}")]
    Network(#[source] reqwest::Error),

    /// The feed answered with a non-2xx status.
    #[error("tick feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The body was not the JSON document we expect.
    #[error("malformed tick feed body: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for TickSourceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() { Self::Timeout } else { Self::Network(error) }
    }
}

/// A source that can report the most recent galaxy tick.
///
/// Fetching is a pure read with no side effects on monitor state.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TickSource: Send + Sync {
    /// Fetches the latest tick reported by the feed.
    async fn fetch_tick(&self) -> Result<TickValue, TickSourceError>;
}
