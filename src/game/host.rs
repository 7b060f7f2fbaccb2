//! Tick-marshaled game action dispatch.
//!
//! The routing core never touches game world state directly; it enqueues
//! [`GameAction`]s, and this loop drains the queue once per tick and hands
//! the actions to a [`GameBackend`]. Actions enqueued mid-tick wait for
//! the next one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::common::messages::GameAction;
use crate::config::types::Config;

/// Interval between world updates for the built-in host loop.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Live server state queried for template context.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub map: String,
    pub cur_players: u32,
    pub max_players: u32,
}

impl ServerInfo {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.server.name.clone(),
            map: "unknown".to_string(),
            cur_players: 0,
            max_players: config.server.max_players,
        }
    }
}

/// The game server side of the action queue.
///
/// Implementations are called from the tick loop only, never from the
/// routing core.
pub trait GameBackend: Send + Sync {
    /// Print a chat line to all connected players.
    fn print_to_chat_all(&self, line: &str);
    /// Execute a server console command.
    fn execute_command(&self, command: &str);
}

/// Drain the action queue once per tick until shutdown.
///
/// On shutdown the remaining queue is flushed before returning, so
/// accepted messages are not silently lost.
pub async fn run_tick_loop(
    backend: Arc<dyn GameBackend>,
    mut actions: mpsc::UnboundedReceiver<GameAction>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                while let Ok(action) = actions.try_recv() {
                    dispatch(backend.as_ref(), action);
                }
            }
            _ = shutdown.changed() => {
                info!("Stopping the game host loop");
                while let Ok(action) = actions.try_recv() {
                    dispatch(backend.as_ref(), action);
                }
                return;
            }
        }
    }
}

fn dispatch(backend: &dyn GameBackend, action: GameAction) {
    match action {
        GameAction::PrintToChatAll(line) => backend.print_to_chat_all(&line),
        GameAction::ExecuteCommand(command) => {
            debug!("Executing server command: {}", command);
            backend.execute_command(&command);
        }
    }
}
