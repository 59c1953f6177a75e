//! Transport-agnostic command handling.
//!
//! The Discord glue translates an inbound `!command` into a
//! [`CommandRequest`] (resolving the caller's permissions through the
//! transport) and renders the resulting [`CommandReply`]. Everything the
//! commands actually *do* lives here, where it can be exercised without a
//! gateway connection.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::warn;

use crate::{
    models::DestinationId,
    monitor::TickMonitor,
    notification::format,
    providers::TickSource,
};

/// The commands users can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `!tick`: current tick plus elapsed time.
    Tick,
    /// `!nexttick`: estimated next tick.
    NextTick,
    /// `!tickchannel`: route announcements to the origin channel
    /// (privileged).
    TickChannel,
    /// `!tickstatus`: monitor state plus a live feed probe.
    TickStatus,
}

/// One inbound command with its transport-resolved context.
#[derive(Debug, Clone, Copy)]
pub struct CommandRequest {
    /// Which command was issued.
    pub command: Command,
    /// The channel the command arrived from.
    pub origin: DestinationId,
    /// Whether the transport's permission model grants the caller elevated
    /// (administrator) rights in the origin context.
    pub caller_is_admin: bool,
}

/// The dispatcher's answer, for the transport to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// A successful response.
    Notice {
        /// Headline.
        title: String,
        /// Pre-formatted body text.
        body: String,
    },
    /// The caller lacks the required permission. No state was changed.
    Refusal(String),
    /// The command could not be served (typically a fetch failure).
    Failure(String),
}

/// Handles user commands against the shared monitor and tick source.
pub struct CommandDispatcher {
    monitor: Arc<TickMonitor>,
    source: Arc<dyn TickSource>,
}

impl CommandDispatcher {
    /// Creates a dispatcher over the running monitor.
    pub fn new(monitor: Arc<TickMonitor>) -> Self {
        let source = monitor.source();
        Self { monitor, source }
    }

    /// Serves one command synchronously (relative to that request).
    pub async fn dispatch(&self, request: CommandRequest) -> CommandReply {
        match request.command {
            Command::Tick => self.current_tick().await,
            Command::NextTick => self.next_tick().await,
            Command::TickChannel => self.reconfigure_channel(request).await,
            Command::TickStatus => self.status().await,
        }
    }

    async fn current_tick(&self) -> CommandReply {
        match self.source.fetch_tick().await {
            Ok(tick) => CommandReply::Notice {
                title: "🌌 Elite Dangerous Galaxy Tick".to_string(),
                body: format::format_tick_announcement(&tick, Utc::now()),
            },
            Err(error) => {
                warn!(%error, "!tick fetch failed");
                CommandReply::Failure(
                    "Unable to fetch tick data. Please try again later.".to_string(),
                )
            }
        }
    }

    async fn next_tick(&self) -> CommandReply {
        match self.source.fetch_tick().await {
            Ok(tick) => CommandReply::Notice {
                title: "⏰ Next Tick Estimate".to_string(),
                body: format::format_next_tick_estimate(&tick, Utc::now()),
            },
            Err(error) => {
                warn!(%error, "!nexttick fetch failed");
                CommandReply::Failure("Unable to fetch tick data.".to_string())
            }
        }
    }

    async fn reconfigure_channel(&self, request: CommandRequest) -> CommandReply {
        if !request.caller_is_admin {
            return CommandReply::Refusal(
                "You need Administrator permission to use this command.".to_string(),
            );
        }

        self.monitor.set_destination(request.origin).await;
        CommandReply::Notice {
            title: "✅ Tick notifications configured".to_string(),
            body: format!(
                "This channel will now receive tick notifications.\nChannel id: {}\n\n\
                 *This setting is not persisted: set `tick_channel_id = {}` in the \
                 configuration to survive restarts.*",
                request.origin, request.origin
            ),
        }
    }

    async fn status(&self) -> CommandReply {
        let state = self.monitor.snapshot().await;

        let last_known = state
            .last_known_tick
            .as_ref()
            .map_or_else(|| "none observed yet".to_string(), ToString::to_string);
        let channel = state
            .destination
            .map_or_else(|| "not configured".to_string(), |d| d.to_string());

        // Live connectivity probe, independent of stored state.
        let started = Instant::now();
        let probe = match self.source.fetch_tick().await {
            Ok(tick) => {
                format!("reachable in {}ms (reports {tick})", started.elapsed().as_millis())
            }
            Err(error) => format!("unreachable ({error})"),
        };

        CommandReply::Notice {
            title: "🔎 Tick Monitor Status".to_string(),
            body: format!(
                "**Last known tick:** {last_known}\n**Notification channel:** {channel}\n\
                 **Check period:** {}s\n**Feed:** {probe}",
                self.monitor.check_interval().as_secs()
            ),
        }
    }
}
