//! Canonical message types for bridge communication.
//!
//! This module defines the single source of truth for the event and
//! message types flowing between the game server host, the routing core,
//! and the Discord client.

use chrono::{DateTime, Local};

use crate::bridge::color::{ChatColor, Rgb};

/// Which side of the bridge a message originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    /// In-game chat.
    GameChat,
    /// The chat platform (Discord).
    Platform,
}

impl MessageOrigin {
    /// Direction label used in relay log lines.
    pub fn label(self) -> &'static str {
        match self {
            MessageOrigin::GameChat => "Game -> Discord",
            MessageOrigin::Platform => "Discord -> Game",
        }
    }
}

/// In-game team, numbered the way the server reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Team {
    #[default]
    None,
    Spectator,
    Terrorist,
    CounterTerrorist,
}

impl Team {
    /// Parse a team from the server's numeric team id.
    pub fn from_num(num: u8) -> Self {
        match num {
            1 => Team::Spectator,
            2 => Team::Terrorist,
            3 => Team::CounterTerrorist,
            _ => Team::None,
        }
    }

    /// The server's numeric team id.
    pub fn num(self) -> u8 {
        match self {
            Team::None => 0,
            Team::Spectator => 1,
            Team::Terrorist => 2,
            Team::CounterTerrorist => 3,
        }
    }

    /// Full team name.
    pub fn name(self) -> &'static str {
        match self {
            Team::None => "None",
            Team::Spectator => "Spectator",
            Team::Terrorist => "Terrorist",
            Team::CounterTerrorist => "Counter-Terrorist",
        }
    }

    /// Short team tag.
    pub fn short(self) -> &'static str {
        match self {
            Team::None => "None",
            Team::Spectator => "Spec",
            Team::Terrorist => "T",
            Team::CounterTerrorist => "CT",
        }
    }

    /// Chat scope label: `[ALL]` for all-chat, team tag for team chat.
    pub fn chat_label(self, team_scoped: bool) -> &'static str {
        if !team_scoped {
            return "[ALL]";
        }
        match self {
            Team::None => "",
            Team::Spectator => "[Spec]",
            Team::Terrorist => "[T]",
            Team::CounterTerrorist => "[CT]",
        }
    }

    /// The chat color associated with this team.
    pub fn color(self) -> ChatColor {
        match self {
            Team::Terrorist => ChatColor::Orange,
            Team::CounterTerrorist => ChatColor::Blue,
            Team::Spectator => ChatColor::Grey,
            Team::None => ChatColor::White,
        }
    }
}

/// Identity of an in-game player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub name: String,
    pub steam_id: u64,
    pub team: Team,
}

/// Events delivered by the game server host.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A chat submission. `player` is `None` for console-originated chat.
    /// `command` is the raw chat command (`say` or `say_team`).
    Chat {
        player: Option<PlayerIdentity>,
        command: String,
        text: String,
    },
    /// A player finished connecting.
    PlayerConnected { player: PlayerIdentity },
    /// A player disconnected.
    PlayerDisconnected { player: PlayerIdentity },
    /// The server changed map.
    MapChanged { map: String },
}

/// An inbound message event from the chat platform.
#[derive(Debug, Clone)]
pub struct PlatformEvent {
    pub channel_id: u64,
    pub channel_name: String,
    pub message_id: u64,
    pub author_name: String,
    pub author_id: u64,
    pub is_bot: bool,
    pub is_webhook: bool,
    /// Color of the author's highest role, if any.
    pub role_color: Option<Rgb>,
    /// Raw message content.
    pub content: String,
    /// Content with mentions resolved to display names.
    pub clean_content: String,
}

/// Actions the core asks the game server host to perform.
///
/// These are enqueued and drained once per server tick by the host; the
/// core never touches game world state directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameAction {
    /// Print a chat line to all connected players.
    PrintToChatAll(String),
    /// Execute a server console command.
    ExecuteCommand(String),
}

/// A normalized chat message after it has passed the sync policy.
///
/// Constructed fresh per event, immutable, discarded after delivery.
/// `content` is never empty.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub origin: MessageOrigin,
    pub sender_name: String,
    pub sender_id: Option<u64>,
    pub team: Team,
    pub team_color: Rgb,
    pub content: String,
    pub team_scoped: bool,
    pub timestamp: DateTime<Local>,
}

/// Author line of a structured message card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

/// Footer line of a structured message card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// A structured outbound platform message (rendered as an embed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub author: Option<CardAuthor>,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub footer: Option<CardFooter>,
    pub color: Option<Rgb>,
    pub description: Option<String>,
    /// Ordered user-declared field pairs; empty values are kept.
    pub fields: Vec<(String, String)>,
}
