//! Prefix command glue. Each command builds a [`CommandRequest`] for the
//! dispatcher and renders the reply as an embed; failures and refusals go out
//! as plain ❌ text.

use poise::{CreateReply, serenity_prelude as serenity};

use super::{Context, Error};
use crate::{
    dispatch::{Command, CommandReply, CommandRequest},
    models::DestinationId,
};

/// Resolves whether the caller holds Administrator in the origin guild,
/// through the gateway cache. DMs and uncached guilds resolve to false.
async fn caller_is_admin(ctx: &Context<'_>) -> bool {
    let Some(member) = ctx.author_member().await else {
        return false;
    };
    let Some(guild) = ctx.guild() else {
        return false;
    };
    guild.member_permissions(&member).administrator()
}

async fn dispatch_and_reply(
    ctx: Context<'_>,
    command: Command,
    caller_is_admin: bool,
    colour: serenity::Colour,
) -> Result<(), Error> {
    let request = CommandRequest {
        command,
        origin: DestinationId::new(ctx.channel_id().get()),
        caller_is_admin,
    };

    match ctx.data().dispatcher.dispatch(request).await {
        CommandReply::Notice { title, body } => {
            let embed = serenity::CreateEmbed::new()
                .title(title)
                .description(body)
                .colour(colour)
                .timestamp(serenity::Timestamp::now())
                .footer(serenity::CreateEmbedFooter::new("Data from tick.infomancer.uk"));
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        CommandReply::Refusal(text) | CommandReply::Failure(text) => {
            ctx.say(format!("❌ {text}")).await?;
        }
    }
    Ok(())
}

/// Display the last Elite Dangerous galaxy tick.
#[poise::command(prefix_command)]
pub async fn tick(ctx: Context<'_>) -> Result<(), Error> {
    dispatch_and_reply(ctx, Command::Tick, false, serenity::Colour::new(0x0099FF)).await
}

/// Display the estimated next galaxy tick.
#[poise::command(prefix_command)]
pub async fn nexttick(ctx: Context<'_>) -> Result<(), Error> {
    dispatch_and_reply(ctx, Command::NextTick, false, serenity::Colour::new(0xFFA500)).await
}

/// Route tick announcements to this channel. Requires Administrator.
#[poise::command(prefix_command, guild_only)]
pub async fn tickchannel(ctx: Context<'_>) -> Result<(), Error> {
    let is_admin = caller_is_admin(&ctx).await;
    dispatch_and_reply(ctx, Command::TickChannel, is_admin, serenity::Colour::new(0x00FF00)).await
}

/// Show monitor state and probe the tick feed.
#[poise::command(prefix_command)]
pub async fn tickstatus(ctx: Context<'_>) -> Result<(), Error> {
    dispatch_and_reply(ctx, Command::TickStatus, false, serenity::Colour::new(0x0099FF)).await
}
