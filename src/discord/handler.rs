//! Discord event handling.
//!
//! The serenity event handler stays thin: it forwards gateway events over
//! an mpsc channel to the processing task, which owns the router and does
//! the actual work. This keeps the handler free of locks and lets the
//! processing task hold non-`Sync` state.

use std::sync::Arc;

use serenity::async_trait;
use serenity::gateway::ActivityData;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::user::OnlineStatus;
use serenity::prelude::*;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, error, info, warn};

use crate::bridge::color::Rgb;
use crate::bridge::{Router, Snapshot};
use crate::common::messages::PlatformEvent;
use crate::config;
use crate::game::ServerInfo;

/// Operator command for reloading the configuration, accepted on the
/// remote-command channel only.
const RELOAD_COMMAND: &str = "!reload";

/// Gateway events forwarded to the processing task.
pub enum DiscordEvent {
    Ready { context: Context, ready: Ready },
    Message { context: Context, message: Message },
}

/// Thin event handler forwarding gateway events to the processing task.
pub struct RelayHandler {
    events_tx: mpsc::UnboundedSender<DiscordEvent>,
}

impl RelayHandler {
    pub fn new(events_tx: mpsc::UnboundedSender<DiscordEvent>) -> Self {
        Self { events_tx }
    }
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, context: Context, ready: Ready) {
        if let Err(error) = self.events_tx.send(DiscordEvent::Ready { context, ready }) {
            warn!("Failed to process discord event: {}", error);
        }
    }

    async fn message(&self, context: Context, message: Message) {
        if let Err(error) = self.events_tx.send(DiscordEvent::Message { context, message }) {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

/// Drive forwarded gateway events into the router until shutdown.
pub async fn process_events(
    mut events_rx: mpsc::UnboundedReceiver<DiscordEvent>,
    router: Arc<Router>,
    server: Arc<RwLock<ServerInfo>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            event = events_rx.recv() => match event {
                Some(DiscordEvent::Ready { context, ready }) => {
                    info!("Discord bot connected as {}", ready.user.name);
                    context.set_presence(
                        Some(ActivityData::playing("Syncing chat messages")),
                        OnlineStatus::Online,
                    );
                }
                Some(DiscordEvent::Message { context, message }) => {
                    handle_message(&router, &server, context, message).await;
                }
                None => {
                    debug!("Discord events channel closed");
                    return;
                }
            },
            _ = shutdown.changed() => {
                info!("Shutdown signal received, stopping event processing");
                return;
            }
        }
    }
}

async fn handle_message(
    router: &Router,
    server: &RwLock<ServerInfo>,
    ctx: Context,
    msg: Message,
) {
    // Filter non-user traffic at the edge.
    if msg.author.bot || msg.webhook_id.is_some() {
        return;
    }
    if msg.author.id == ctx.cache.current_user().id {
        return;
    }
    if msg.guild_id.is_none() {
        return;
    }

    let content = msg.content.trim().to_string();
    if content.is_empty() && msg.attachments.is_empty() {
        return;
    }

    let snapshot = router.snapshot().await;
    if snapshot.routing.remote_command() == Some(msg.channel_id.get()) && content == RELOAD_COMMAND
    {
        reload_config(router, server, &ctx, &msg).await;
        return;
    }

    // Resolve channel name and role color from the cache; owned copies
    // only, the cache ref must not live across an await.
    let (channel_name, role_color) = match msg.guild(&ctx.cache) {
        Some(guild) => {
            let name = guild
                .channels
                .get(&msg.channel_id)
                .map(|channel| channel.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            let color = guild
                .members
                .get(&msg.author.id)
                .and_then(|member| guild.member_highest_role(member))
                .map(|role| role.colour)
                .filter(|colour| colour.0 != 0)
                .map(|colour| Rgb {
                    r: colour.r(),
                    g: colour.g(),
                    b: colour.b(),
                });
            (name, color)
        }
        None => ("unknown".to_string(), None),
    };

    // Prefer the guild nickname, like members see it.
    let author_name = msg
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .unwrap_or_else(|| msg.author.name.clone());

    let mut clean_content = msg.content_safe(&ctx.cache).trim().to_string();
    let mut content = content;
    for attachment in &msg.attachments {
        for target in [&mut content, &mut clean_content] {
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(&attachment.url);
        }
    }

    router
        .on_platform_event(PlatformEvent {
            channel_id: msg.channel_id.get(),
            channel_name,
            message_id: msg.id.get(),
            author_name,
            author_id: msg.author.id.get(),
            is_bot: false,
            is_webhook: false,
            role_color,
            content,
            clean_content,
        })
        .await;
}

/// Reload the configuration from disk and swap the router snapshot. On
/// failure the previous snapshot stays in effect.
async fn reload_config(router: &Router, server: &RwLock<ServerInfo>, ctx: &Context, msg: &Message) {
    let path = config::env::get_config_path();
    let reply = match config::load_and_validate(&path) {
        Ok(new_config) => {
            router.reload(Snapshot::from_config(&new_config)).await;
            {
                let mut server = server.write().await;
                server.name = new_config.server.name.clone();
                server.max_players = new_config.server.max_players;
            }
            info!("Configuration reloaded from '{}'", path);
            "Configuration reloaded.".to_string()
        }
        Err(e) => {
            error!("Configuration reload failed: {}", e);
            format!("Reload failed: {}", e)
        }
    };

    if let Err(e) = msg.reply(&ctx.http, reply).await {
        error!("Failed to send reload reply: {}", e);
    }
}
