//! Configuration type definitions.

use std::collections::HashMap;

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub server: ServerConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub format: FormatConfig,
}

fn default_schema_version() -> u32 {
    crate::config::migrate::CURRENT_SCHEMA_VERSION
}

/// Game server display settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Display name shown in `{Server.Name}`.
    pub name: String,
    pub max_players: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Game Server".to_string(),
            max_players: 16,
        }
    }
}

/// Discord bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Empty disables the Discord side entirely.
    #[serde(default)]
    pub token: String,
    /// Primary channel mirrored bidirectionally with game chat. Zero
    /// disables chat sync.
    #[serde(default)]
    pub sync_channel_id: u64,
    /// Channel receiving lifecycle notifications. Zero disables them.
    #[serde(default)]
    pub system_channel_id: u64,
    /// Channel whose messages are executed as server commands. Zero
    /// disables remote commands.
    #[serde(default)]
    pub command_channel_id: u64,
    /// Additional channels read into game chat but not written to.
    #[serde(default)]
    pub additional_read_channel_ids: Vec<u64>,
    /// Required prefix for remote commands; empty means none required.
    #[serde(default)]
    pub command_prefix: String,
}

/// Token value shipped in example configs.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_DISCORD_TOKEN_HERE";

impl DiscordConfig {
    /// Whether a usable credential is configured.
    pub fn enabled(&self) -> bool {
        !self.token.is_empty() && self.token != PLACEHOLDER_TOKEN
    }
}

/// Relay policy settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Relay team chat.
    pub team_chat: bool,
    /// Relay chat submitted from the server console.
    pub console_chat: bool,
    /// Skip messages starting with an in-game chat trigger character.
    pub ignore_chat_triggers: bool,
    pub chat_trigger_chars: String,
    /// Required message prefix opting a game chat line into relay;
    /// stripped before relay. Empty relays everything.
    pub trigger: String,
    /// Deprecated predecessor of `trigger`.
    pub message_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            team_chat: false,
            console_chat: false,
            ignore_chat_triggers: true,
            chat_trigger_chars: "!/".to_string(),
            trigger: String::new(),
            message_prefix: String::new(),
        }
    }
}

/// Message formatting settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// chrono format string for `{Time}`.
    pub time: String,
    /// chrono format string for `{Date}`.
    pub date: String,
    /// Header template for platform messages printed to game chat.
    pub chat_line: String,
    pub embed: EmbedConfig,
    /// Ordered embed field templates.
    pub embed_fields: Vec<EmbedField>,
    /// Lifecycle event name -> message template. A missing or empty
    /// template opts that event out of relaying.
    pub system_events: HashMap<String, String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        let mut system_events = HashMap::new();
        system_events.insert(
            "player_connect".to_string(),
            "{Player.Name} connected ({Server.CurPlayers}/{Server.MaxPlayers})".to_string(),
        );
        system_events.insert(
            "player_disconnect".to_string(),
            "{Player.Name} disconnected ({Server.CurPlayers}/{Server.MaxPlayers})".to_string(),
        );
        system_events.insert(
            "map_change".to_string(),
            "Changed map to {Server.MapName}".to_string(),
        );

        Self {
            time: "%H:%M:%S".to_string(),
            date: "%d.%m.%Y".to_string(),
            chat_line: "[Discord - {Channel}] {UsernameStyled} ({Date} {Time}): {Message}"
                .to_string(),
            embed: EmbedConfig::default(),
            embed_fields: vec![
                EmbedField {
                    name: "Server".to_string(),
                    value: "{Server.Name}".to_string(),
                },
                EmbedField {
                    name: "Map".to_string(),
                    value: "{Server.MapName}".to_string(),
                },
                EmbedField {
                    name: "Players".to_string(),
                    value: "{Server.CurPlayers}/{Server.MaxPlayers}".to_string(),
                },
            ],
            system_events,
        }
    }
}

/// Embed metadata templates; an empty template omits that part.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub author: String,
    pub avatar_url: String,
    pub title: String,
    pub thumbnail_url: String,
    pub footer: String,
    pub footer_icon_url: String,
    /// Hex literal or `{TeamColor}`; empty omits the color.
    pub color: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            author: "{Chat.Team} {Player.Name}".to_string(),
            avatar_url: String::new(),
            title: String::new(),
            thumbnail_url: String::new(),
            footer: String::new(),
            footer_icon_url: String::new(),
            color: "{TeamColor}".to_string(),
        }
    }
}

/// A single ordered embed field.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}
