//! Serenity event handler implementation

use meme_types::{ContextMessage, OutboundMessage};
use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

use crate::commands::{self, Command};
use crate::dispatcher::RecommendationDispatcher;
use crate::errors::{self, SendSeverity};
use crate::health::AppState;
use crate::render;

pub struct Handler {
    dispatcher: Arc<RecommendationDispatcher>,
    prefix: String,
    health: AppState,
}

impl Handler {
    pub fn new(dispatcher: Arc<RecommendationDispatcher>, prefix: String, health: AppState) -> Self {
        Self {
            dispatcher,
            prefix,
            health,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "{} is ready, connected to {} guild(s)",
            ready.user.name,
            ready.guilds.len()
        );
        self.health.set_bot_username(ready.user.name.clone()).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Skip our own messages
        if msg.author.id == ctx.cache.current_user().id {
            return;
        }

        let channel_id = msg.channel_id.get();
        let author = author_name(&msg);

        self.dispatcher
            .contexts()
            .insert(
                channel_id,
                ContextMessage::new(author.clone(), msg.content.clone(), *msg.timestamp),
            )
            .await;

        if let Some(command) = command_in(&self.prefix, &msg) {
            debug!(channel_id, ?command, "Running command");
            let outbound =
                commands::execute(&self.dispatcher, command, channel_id, &author, &self.prefix)
                    .await;
            if let Err(e) = send(&ctx, msg.channel_id, outbound).await {
                // The reply itself was refused (too large, bad embed); say so in plain text.
                if errors::classify(&e) == SendSeverity::Permanent {
                    let notice = OutboundMessage::text(render::COMMAND_FAILURE_NOTICE);
                    let _ = send(&ctx, msg.channel_id, notice).await;
                }
            }
        }

        if let Some(rec) = self.dispatcher.maybe_auto_recommend(channel_id).await {
            let _ = send(&ctx, msg.channel_id, render::recommendation(&rec)).await;
        }
    }
}

/// Command carried by `msg`, if any. Other bots never run commands.
fn command_in(prefix: &str, msg: &Message) -> Option<Command> {
    if msg.author.bot {
        return None;
    }
    Command::parse(prefix, &msg.content)
}

/// Guild nickname when there is one, otherwise the user's display name.
fn author_name(msg: &Message) -> String {
    msg.member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| msg.author.display_name().to_string())
}

/// Send and log failures. The error is handed back for callers that react to it.
async fn send(
    ctx: &Context,
    channel: ChannelId,
    outbound: OutboundMessage,
) -> Result<(), serenity::Error> {
    match channel.send_message(ctx, to_create_message(outbound)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            errors::log_send_error(channel.get(), &e);
            Err(e)
        }
    }
}

fn to_create_message(outbound: OutboundMessage) -> CreateMessage {
    match outbound {
        OutboundMessage::Text { content } => CreateMessage::new().content(content),
        OutboundMessage::Embed(embed) => {
            let mut builder = CreateEmbed::new()
                .title(embed.title)
                .description(embed.description)
                .colour(embed.color);
            if let Some(url) = embed.image_url {
                builder = builder.image(url);
            }
            if let Some(footer) = embed.footer {
                builder = builder.footer(CreateEmbedFooter::new(footer));
            }
            CreateMessage::new().embed(builder)
        }
    }
}
