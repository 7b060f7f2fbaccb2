//! Inbound event classification.
//!
//! Assigns every inbound event a message kind before filtering and
//! transformation. Classification is pure; unknown events are dropped
//! downstream without logging.

use crate::bridge::routing::{ChannelRole, RoutingTable};

/// Classified kind of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Player all-chat from the game side.
    PlayerChat,
    /// Player team chat from the game side.
    TeamChat,
    /// Chat submitted from the server console.
    ConsoleChat,
    /// Lifecycle notification (connect/disconnect/map change).
    SystemEvent,
    /// Platform message to be executed as a server command.
    RemoteCommand,
    /// Platform message on the primary sync channel.
    PlatformChat,
    /// Platform message on an additional read-only channel.
    Broadcast,
    /// Everything else; dropped downstream.
    Unknown,
}

impl MessageKind {
    /// True for kinds that originate from in-game chat submissions.
    pub fn is_game_chat(self) -> bool {
        matches!(
            self,
            MessageKind::PlayerChat | MessageKind::TeamChat | MessageKind::ConsoleChat
        )
    }
}

/// Classify a platform-side message by its channel role.
pub fn classify_platform(channel_id: u64, routing: &RoutingTable) -> MessageKind {
    match routing.role_of(channel_id) {
        Some(ChannelRole::Primary) => MessageKind::PlatformChat,
        Some(ChannelRole::Broadcast) => MessageKind::Broadcast,
        Some(ChannelRole::RemoteCommand) => MessageKind::RemoteCommand,
        _ => MessageKind::Unknown,
    }
}

/// Classify a game-side chat submission.
///
/// Events without a player identity come from the server console. Only
/// the `say` and `say_team` commands are chat; anything else is Unknown.
pub fn classify_game(command: &str, has_player: bool) -> MessageKind {
    if !has_player {
        return MessageKind::ConsoleChat;
    }
    match command {
        "say" => MessageKind::PlayerChat,
        "say_team" => MessageKind::TeamChat,
        _ => MessageKind::Unknown,
    }
}
