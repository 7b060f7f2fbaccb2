//! Discord client lifecycle.
//!
//! Builds the serenity client with the gateway intents the bridge needs
//! and runs it until shutdown, closing the gateway connection cleanly.

use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::discord::handler::{DiscordEvent, RelayHandler};

pub async fn build_client(
    token: &str,
    events_tx: mpsc::UnboundedSender<DiscordEvent>,
) -> anyhow::Result<Client> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS;

    let client = Client::builder(token, intents)
        .event_handler(RelayHandler::new(events_tx))
        .await?;
    Ok(client)
}

/// Run the gateway connection until it ends or shutdown is signaled.
pub async fn run_client(mut client: Client, mut shutdown: watch::Receiver<bool>) {
    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
            }
        }
        _ = async {
            loop {
                shutdown.changed().await.ok();
                if *shutdown.borrow() {
                    break;
                }
            }
            info!("Initiating graceful Discord shutdown...");
            shard_manager.shutdown_all().await;
            info!("Discord shutdown complete");
        } => {}
    }
    info!("Discord task ended");
}
