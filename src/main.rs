//! Towncrier - game server chat to Discord bridge
//!
//! Relays in-game chat to a Discord channel as embeds, prints Discord
//! messages back into game chat, posts server lifecycle notifications,
//! and executes remote commands from a dedicated channel.

mod bridge;
mod common;
mod config;
mod discord;
mod game;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{error, info, warn};

use bridge::{PlatformSink, Router, Snapshot};
use common::messages::{GameAction, GameEvent};
use config::{env::get_config_path, load_and_validate};
use discord::{DisabledSink, DiscordSink};
use game::console::{run_console_source, ConsoleBackend};
use game::ServerInfo;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Towncrier v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!(
            "Please ensure {} exists and is properly formatted.",
            config_path
        );
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Server: {}", config.server.name);
    info!("  Sync channel: {}", config.discord.sync_channel_id);
    info!("  System channel: {}", config.discord.system_channel_id);
    info!("  Command channel: {}", config.discord.command_channel_id);

    // ============================================================
    // Channels and shared state
    // ============================================================
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (game_events_tx, mut game_events_rx) = mpsc::unbounded_channel::<GameEvent>();
    let (game_actions_tx, game_actions_rx) = mpsc::unbounded_channel::<GameAction>();
    let (discord_events_tx, discord_events_rx) = mpsc::unbounded_channel();

    let server = Arc::new(RwLock::new(ServerInfo::from_config(&config)));

    // ============================================================
    // Discord client and router
    // ============================================================
    // Without a usable credential the Discord side degrades to a no-op
    // sink and the game host keeps running.
    let mut tasks: Vec<(&str, tokio::task::JoinHandle<()>)> = Vec::new();

    let sink: Arc<dyn PlatformSink>;
    let client = if config.discord.enabled() {
        info!("Starting Discord bot...");
        let client = discord::build_client(&config.discord.token, discord_events_tx).await?;
        sink = Arc::new(DiscordSink::new(client.http.clone()));
        Some(client)
    } else {
        warn!("No Discord token configured - running without Discord");
        sink = Arc::new(DisabledSink);
        None
    };

    let router = Arc::new(Router::new(
        Snapshot::from_config(&config),
        sink,
        game_actions_tx,
        server.clone(),
    ));

    if let Some(client) = client {
        tasks.push((
            "Discord client",
            tokio::spawn(discord::run_client(client, shutdown_rx.clone())),
        ));
        tasks.push((
            "event processing",
            tokio::spawn(discord::process_events(
                discord_events_rx,
                router.clone(),
                server.clone(),
                shutdown_rx.clone(),
            )),
        ));
    }

    // ============================================================
    // Game host: tick loop, console harness, event pump
    // ============================================================
    tasks.push((
        "game host loop",
        tokio::spawn(game::run_tick_loop(
            Arc::new(ConsoleBackend),
            game_actions_rx,
            shutdown_rx.clone(),
        )),
    ));

    let console_task = tokio::spawn(run_console_source(game_events_tx, shutdown_rx.clone()));

    let game_events_task = {
        let router = router.clone();
        tokio::spawn(async move {
            while let Some(event) = game_events_rx.recv().await {
                router.on_game_event(event).await;
            }
            info!("Game event pump ended");
        })
    };

    // ============================================================
    // Run until a task ends or a shutdown signal arrives
    // ============================================================
    tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - shutting down gracefully...");
        }
        _ = console_task => info!("Console input ended - shutting down..."),
        _ = game_events_task => {},
    }

    if let Err(e) = shutdown_tx.send(true) {
        warn!("Shutdown channel closed: {}", e);
    }

    let timeout = tokio::time::Duration::from_secs(5);
    for (name, task) in tasks {
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("The {} task panicked: {}", name, e),
            Err(_) => warn!("Timed out waiting for the {} task", name),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
