//! Delivery of tick announcements through the Discord REST API.

use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;

use crate::{
    models::DestinationId,
    notification::{NotificationError, Notifier, TickMessage},
};

/// Sends announcements to a Discord channel as an `@here` ping plus embed.
pub struct DiscordNotifier {
    http: Arc<serenity::Http>,
}

impl DiscordNotifier {
    /// Creates a notifier over an established gateway session's HTTP handle.
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(
        &self,
        destination: DestinationId,
        message: &TickMessage,
    ) -> Result<(), NotificationError> {
        let embed = serenity::CreateEmbed::new()
            .title(message.title.clone())
            .description(message.body.clone())
            .colour(serenity::Colour::new(0x00FF00))
            .timestamp(serenity::Timestamp::now())
            .footer(serenity::CreateEmbedFooter::new("Data from tick.infomancer.uk"));

        serenity::ChannelId::new(destination.get())
            .send_message(&self.http, serenity::CreateMessage::new().content("@here").embed(embed))
            .await
            .map_err(|e| NotificationError::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}
