//! Line-oriented console event source.
//!
//! Development harness standing in for a real game server hook. Reads
//! commands from stdin, one per line, mirroring a listen-server console:
//!
//! ```text
//! connect <name> [t|ct|spec]
//! disconnect <name>
//! map <map name>
//! say <name> <text>
//! say_team <name> <text>
//! console <text>
//! ```
//!
//! Players must `connect` before chatting so the harness can attach a
//! team and a synthetic steam id to their messages.

use std::collections::HashMap;

use tokio::io::AsyncBufReadExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::common::messages::{GameEvent, PlayerIdentity, Team};
use crate::game::GameBackend;

/// First synthetic steam id handed out by the harness.
const STEAM_ID_BASE: u64 = 76561198000000001;

/// Parses console lines into game events, tracking the connected roster.
pub struct ConsoleSource {
    roster: HashMap<String, PlayerIdentity>,
    next_steam_id: u64,
}

impl ConsoleSource {
    pub fn new() -> Self {
        Self {
            roster: HashMap::new(),
            next_steam_id: STEAM_ID_BASE,
        }
    }

    /// Parse one console line. Unknown verbs and malformed lines return
    /// `None` with a warning.
    pub fn parse_line(&mut self, line: &str) -> Option<GameEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        match verb {
            "connect" => {
                let mut parts = rest.split_whitespace();
                let name = parts.next()?.to_string();
                let team = parts.next().map(parse_team).unwrap_or(Team::None);
                let player = PlayerIdentity {
                    name: name.clone(),
                    steam_id: self.next_steam_id,
                    team,
                };
                self.next_steam_id += 1;
                self.roster.insert(name, player.clone());
                Some(GameEvent::PlayerConnected { player })
            }
            "disconnect" => {
                let name = rest.trim();
                match self.roster.remove(name) {
                    Some(player) => Some(GameEvent::PlayerDisconnected { player }),
                    None => {
                        warn!("Unknown player '{}'", name);
                        None
                    }
                }
            }
            "map" => {
                let map = rest.trim();
                if map.is_empty() {
                    return None;
                }
                Some(GameEvent::MapChanged {
                    map: map.to_string(),
                })
            }
            "say" | "say_team" => {
                let (name, text) = rest.split_once(' ')?;
                let Some(player) = self.roster.get(name) else {
                    warn!("Unknown player '{}' (use `connect` first)", name);
                    return None;
                };
                Some(GameEvent::Chat {
                    player: Some(player.clone()),
                    command: verb.to_string(),
                    text: text.to_string(),
                })
            }
            "console" => Some(GameEvent::Chat {
                player: None,
                command: "say".to_string(),
                text: rest.to_string(),
            }),
            _ => {
                warn!("Unknown console verb '{}'", verb);
                None
            }
        }
    }
}

impl Default for ConsoleSource {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_team(tag: &str) -> Team {
    match tag.to_ascii_lowercase().as_str() {
        "t" => Team::Terrorist,
        "ct" => Team::CounterTerrorist,
        "spec" => Team::Spectator,
        _ => Team::None,
    }
}

/// Read console lines from stdin until EOF or shutdown, forwarding parsed
/// events to the router task.
pub async fn run_console_source(
    events: mpsc::UnboundedSender<GameEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut source = ConsoleSource::new();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Some(event) = source.parse_line(&line) {
                        if events.send(event).is_err() {
                            return;
                        }
                    }
                }
                Ok(None) => {
                    debug!("Console input closed");
                    return;
                }
                Err(e) => {
                    warn!("Failed to read console input: {}", e);
                    return;
                }
            },
            _ = shutdown.changed() => {
                info!("Stopping the console event source");
                return;
            }
        }
    }
}

/// Stdout-backed game backend for the console harness.
pub struct ConsoleBackend;

impl GameBackend for ConsoleBackend {
    fn print_to_chat_all(&self, line: &str) {
        println!("{}", line);
    }

    fn execute_command(&self, command: &str) {
        info!("Console backend ignoring server command '{}'", command);
    }
}
