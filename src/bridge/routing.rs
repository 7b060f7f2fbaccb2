//! Channel routing table.
//!
//! Maps opaque platform channel ids to their bridge roles. A zero or
//! absent id means the feature is disabled; operations against a disabled
//! channel are no-ops, never errors.

use std::collections::HashSet;

use crate::config::types::DiscordConfig;

/// Role of a platform channel in the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    /// Mirrored bidirectionally with game chat.
    Primary,
    /// Receives lifecycle notifications.
    System,
    /// Messages are executed as server commands.
    RemoteCommand,
    /// Read into game chat but not written to.
    Broadcast,
}

/// Configuration-derived channel mapping. Built once at startup, replaced
/// wholesale on reload.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    primary: Option<u64>,
    system: Option<u64>,
    remote_command: Option<u64>,
    broadcast: HashSet<u64>,
}

fn non_zero(id: u64) -> Option<u64> {
    (id != 0).then_some(id)
}

impl RoutingTable {
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self {
            primary: non_zero(config.sync_channel_id),
            system: non_zero(config.system_channel_id),
            remote_command: non_zero(config.command_channel_id),
            broadcast: config
                .additional_read_channel_ids
                .iter()
                .copied()
                .filter(|id| *id != 0)
                .collect(),
        }
    }

    pub fn primary(&self) -> Option<u64> {
        self.primary
    }

    pub fn system(&self) -> Option<u64> {
        self.system
    }

    pub fn remote_command(&self) -> Option<u64> {
        self.remote_command
    }

    /// Determine the role of a channel, primary first.
    pub fn role_of(&self, channel_id: u64) -> Option<ChannelRole> {
        if self.primary == Some(channel_id) {
            Some(ChannelRole::Primary)
        } else if self.broadcast.contains(&channel_id) {
            Some(ChannelRole::Broadcast)
        } else if self.remote_command == Some(channel_id) {
            Some(ChannelRole::RemoteCommand)
        } else if self.system == Some(channel_id) {
            Some(ChannelRole::System)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RoutingTable {
        RoutingTable::from_config(&DiscordConfig {
            token: "t".to_string(),
            sync_channel_id: 100,
            system_channel_id: 200,
            command_channel_id: 300,
            additional_read_channel_ids: vec![400, 401, 0],
            command_prefix: String::new(),
        })
    }

    #[test]
    fn test_roles() {
        let t = table();
        assert_eq!(t.role_of(100), Some(ChannelRole::Primary));
        assert_eq!(t.role_of(200), Some(ChannelRole::System));
        assert_eq!(t.role_of(300), Some(ChannelRole::RemoteCommand));
        assert_eq!(t.role_of(400), Some(ChannelRole::Broadcast));
        assert_eq!(t.role_of(401), Some(ChannelRole::Broadcast));
        assert_eq!(t.role_of(999), None);
    }

    #[test]
    fn test_zero_means_disabled() {
        let t = RoutingTable::from_config(&DiscordConfig {
            token: "t".to_string(),
            sync_channel_id: 0,
            system_channel_id: 0,
            command_channel_id: 0,
            additional_read_channel_ids: vec![0],
            command_prefix: String::new(),
        });
        assert_eq!(t.primary(), None);
        assert_eq!(t.system(), None);
        assert_eq!(t.remote_command(), None);
        assert_eq!(t.role_of(0), None);
    }

    #[test]
    fn test_primary_wins_over_broadcast() {
        let mut config = DiscordConfig {
            token: "t".to_string(),
            sync_channel_id: 100,
            system_channel_id: 0,
            command_channel_id: 0,
            additional_read_channel_ids: vec![100],
            command_prefix: String::new(),
        };
        config.additional_read_channel_ids.push(100);
        let t = RoutingTable::from_config(&config);
        assert_eq!(t.role_of(100), Some(ChannelRole::Primary));
    }
}
