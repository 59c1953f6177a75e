//! Discord front end: poise framework wiring, command glue and the
//! serenity-backed [`Notifier`](crate::notification::Notifier).

mod commands;
mod notifier;

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub use notifier::DiscordNotifier;

use crate::{
    config::AppConfig,
    dispatch::CommandDispatcher,
    http_client::create_http_client,
    monitor::TickMonitor,
    notification::Notifier,
    providers::{GaltickSource, TickSource},
};

/// Shared state handed to every command invocation.
pub struct Data {
    /// The transport-agnostic command core.
    pub dispatcher: Arc<CommandDispatcher>,
}

/// Error type threaded through the poise framework.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
/// Command invocation context.
pub type Context<'a> = poise::Context<'a, Data, Error>;

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().name, %error, "Command failed");
            let _ = ctx.say("❌ Something went wrong handling that command.").await;
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(error = %e, "Error handler itself failed");
            }
        }
    }
}

/// Connects to Discord and runs until a shutdown signal.
///
/// The tick poller is spawned once the gateway session is ready, so the
/// notifier has an HTTP handle to deliver announcements with. Ctrl-C shuts
/// down the shards and cancels the poll loop.
pub async fn run(config: AppConfig) -> Result<(), Error> {
    let http_client = create_http_client(&config.http)?;
    let source: Arc<dyn TickSource> =
        Arc::new(GaltickSource::new(http_client, config.tick_url.clone()));

    let shutdown = CancellationToken::new();
    let poller_shutdown = shutdown.clone();
    let check_interval = config.check_interval;
    let destination = config.notification_destination();

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::tick(),
                commands::nexttick(),
                commands::tickchannel(),
                commands::tickstatus(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".to_string()),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!(user = %ready.user.name, "Connected to Discord");
                let notifier: Arc<dyn Notifier> =
                    Arc::new(DiscordNotifier::new(ctx.http.clone()));
                let monitor =
                    Arc::new(TickMonitor::new(source, notifier, check_interval, destination));
                tokio::spawn(Arc::clone(&monitor).run(poller_shutdown));
                Ok(Data { dispatcher: Arc::new(CommandDispatcher::new(monitor)) })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    let shard_manager = client.shard_manager.clone();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_shutdown.cancel();
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await?;
    Ok(())
}
