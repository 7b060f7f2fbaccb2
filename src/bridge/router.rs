//! Event orchestration: classify, filter, transform, deliver.
//!
//! The router receives inbound events from both sides of the bridge and
//! drives them through the core pipeline. Failures in rendering or
//! delivery are contained per event: logged, the message dropped, never
//! propagated back to the event source.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::Local;
use serenity::async_trait;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::bridge::classify::{classify_game, classify_platform, MessageKind};
use crate::bridge::color::{ChatColor, Rgb, DEFAULT_COLOR_CODE};
use crate::bridge::policy::SyncPolicy;
use crate::bridge::routing::RoutingTable;
use crate::bridge::segment::segment;
use crate::bridge::template::{render, render_card, TemplateContext};
use crate::common::error::{DeliveryError, DeliveryResult};
use crate::common::messages::{
    Card, CardAuthor, ChatMessage, GameAction, GameEvent, MessageOrigin, PlatformEvent,
    PlayerIdentity, Team,
};
use crate::config::types::Config;
use crate::game::ServerInfo;

/// Outbound platform delivery boundary.
///
/// Sends may be issued from any task; the platform client is responsible
/// for its own thread safety.
#[async_trait]
pub trait PlatformSink: Send + Sync {
    /// Send a structured card message to a channel.
    async fn send_card(&self, channel_id: u64, card: Card) -> DeliveryResult<()>;
    /// Reply to a specific message with plain text.
    async fn reply(&self, channel_id: u64, message_id: u64, text: &str) -> DeliveryResult<()>;
}

/// Immutable configuration snapshot used by in-flight dispatches.
///
/// Replaced wholesale on reload; a dispatch keeps the `Arc` it started
/// with and never observes a partial update.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub routing: RoutingTable,
    pub policy: SyncPolicy,
    pub format: crate::config::types::FormatConfig,
    /// Required prefix for remote commands; empty means none.
    pub command_prefix: String,
}

impl Snapshot {
    pub fn from_config(config: &Config) -> Self {
        Self {
            routing: RoutingTable::from_config(&config.discord),
            policy: SyncPolicy::from_config(&config.sync),
            format: config.format.clone(),
            command_prefix: config.discord.command_prefix.clone(),
        }
    }
}

/// The bridge router. Owns the configuration snapshot, the platform sink,
/// and the tick-marshaled game action queue.
pub struct Router {
    snapshot: RwLock<Arc<Snapshot>>,
    platform: Arc<dyn PlatformSink>,
    game_tx: mpsc::UnboundedSender<GameAction>,
    server: Arc<RwLock<ServerInfo>>,
    /// Channel purposes already warned about, so a disabled channel logs
    /// once instead of per message.
    disabled_warned: StdMutex<HashSet<&'static str>>,
}

impl Router {
    pub fn new(
        snapshot: Snapshot,
        platform: Arc<dyn PlatformSink>,
        game_tx: mpsc::UnboundedSender<GameAction>,
        server: Arc<RwLock<ServerInfo>>,
    ) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            platform,
            game_tx,
            server,
            disabled_warned: StdMutex::new(HashSet::new()),
        }
    }

    /// Current configuration snapshot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Atomically swap in a new configuration snapshot.
    pub async fn reload(&self, snapshot: Snapshot) {
        *self.snapshot.write().await = Arc::new(snapshot);
        self.disabled_warned.lock().unwrap().clear();
    }

    /// Handle an event from the game server host.
    pub async fn on_game_event(&self, event: GameEvent) {
        let snap = self.snapshot().await;

        match event {
            GameEvent::Chat {
                player,
                command,
                text,
            } => self.relay_game_chat(&snap, player, &command, &text).await,
            GameEvent::PlayerConnected { player } => {
                {
                    let mut server = self.server.write().await;
                    server.cur_players += 1;
                }
                let ctx = self.player_context(&snap, &player).await;
                self.relay_system_event(&snap, "player_connect", ctx).await;
            }
            GameEvent::PlayerDisconnected { player } => {
                {
                    let mut server = self.server.write().await;
                    server.cur_players = server.cur_players.saturating_sub(1);
                }
                let ctx = self.player_context(&snap, &player).await;
                self.relay_system_event(&snap, "player_disconnect", ctx)
                    .await;
            }
            GameEvent::MapChanged { map } => {
                {
                    let mut server = self.server.write().await;
                    server.map = map;
                }
                let ctx = self.base_context(&snap).await;
                self.relay_system_event(&snap, "map_change", ctx).await;
            }
        }
    }

    /// Handle an inbound message from the chat platform.
    pub async fn on_platform_event(&self, event: PlatformEvent) {
        if event.is_bot || event.is_webhook {
            return;
        }

        let snap = self.snapshot().await;

        match classify_platform(event.channel_id, &snap.routing) {
            kind @ (MessageKind::PlatformChat | MessageKind::Broadcast) => {
                self.relay_platform_chat(&snap, &event, kind).await;
            }
            MessageKind::RemoteCommand => {
                self.execute_remote_command(&snap, &event).await;
            }
            _ => {}
        }
    }

    /// Game chat -> platform card.
    async fn relay_game_chat(
        &self,
        snap: &Snapshot,
        player: Option<PlayerIdentity>,
        command: &str,
        text: &str,
    ) {
        let kind = classify_game(command, player.is_some());
        let Some(content) = snap.policy.apply(kind, text) else {
            return;
        };

        let team = player.as_ref().map(|p| p.team).unwrap_or(Team::None);
        let message = ChatMessage {
            origin: MessageOrigin::GameChat,
            sender_name: player
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Console".to_string()),
            sender_id: player.as_ref().map(|p| p.steam_id),
            team,
            team_color: team.color().rgb(),
            content,
            team_scoped: kind == MessageKind::TeamChat,
            timestamp: Local::now(),
        };

        info!(
            "{} [{}]: {}",
            message.origin.label(),
            message.sender_name,
            message.content
        );

        let ctx = self
            .base_context(snap)
            .await
            .with_timestamp(message.timestamp)
            .with("Player.Name", &message.sender_name)
            .with(
                "Player.SteamID",
                message.sender_id.unwrap_or(0).to_string(),
            )
            .with("Player.TeamName", message.team.name())
            .with("Player.Team", message.team.short())
            .with("Player.TeamNum", message.team.num().to_string())
            .with("Chat.Team", message.team.chat_label(message.team_scoped))
            .with("Chat.Message", &message.content)
            .with_team_color(message.team_color);

        let fields: Vec<(String, String)> = snap
            .format
            .embed_fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();

        let mut card = render_card(&snap.format.embed, &fields, &ctx);
        card.description = Some(message.content.clone());

        self.deliver_card(snap.routing.primary(), "chat sync", card)
            .await;
    }

    /// Platform chat -> in-game chat lines.
    async fn relay_platform_chat(&self, snap: &Snapshot, event: &PlatformEvent, kind: MessageKind) {
        let Some(content) = snap.policy.apply(kind, &event.clean_content) else {
            return;
        };

        let message = ChatMessage {
            origin: MessageOrigin::Platform,
            sender_name: event.author_name.clone(),
            sender_id: Some(event.author_id),
            team: Team::None,
            team_color: event.role_color.unwrap_or(Rgb::WHITE),
            content,
            team_scoped: false,
            timestamp: Local::now(),
        };

        let segmented = segment(&message.content);
        if segmented.lines.is_empty() {
            return;
        }

        info!(
            "{} [{}]: {}",
            message.origin.label(),
            event.channel_name,
            message.content
        );

        let name_color = ChatColor::from_rgb(message.team_color);
        let styled_name = format!(
            "{}{}{}",
            name_color.code(),
            message.sender_name,
            DEFAULT_COLOR_CODE
        );

        let inline_message = if segmented.inline {
            segmented.lines[0].clone()
        } else {
            String::new()
        };

        let ctx = self
            .base_context(snap)
            .await
            .with_timestamp(message.timestamp)
            .with("Channel", &event.channel_name)
            .with("Username", &message.sender_name)
            .with("UsernameStyled", styled_name)
            .with("Message", inline_message);

        let mut lines = vec![render(&snap.format.chat_line, &ctx)];
        if !segmented.inline {
            // Blank separator between header and body, so the body lines
            // read as one block.
            lines.push(" ".to_string());
            lines.extend(segmented.lines);
        }

        for line in lines {
            if self.game_tx.send(GameAction::PrintToChatAll(line)).is_err() {
                warn!("Game action queue closed, dropping chat lines");
                return;
            }
        }
    }

    /// Remote-command channel message -> server command execution.
    async fn execute_remote_command(&self, snap: &Snapshot, event: &PlatformEvent) {
        let content = event.content.trim();
        let lines: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();

        if lines.len() != 1 {
            self.reply(event, "Commands must be a single non-blank line.")
                .await;
            return;
        }

        let mut command = lines[0].trim();
        if !snap.command_prefix.is_empty() {
            match command.strip_prefix(&snap.command_prefix) {
                Some(rest) => command = rest.trim(),
                None => {
                    self.reply(
                        event,
                        &format!("Commands must start with `{}`.", snap.command_prefix),
                    )
                    .await;
                    return;
                }
            }
        }

        if command.is_empty() {
            self.reply(event, "Commands must be a single non-blank line.")
                .await;
            return;
        }

        if self
            .game_tx
            .send(GameAction::ExecuteCommand(command.to_string()))
            .is_err()
        {
            error!("Game action queue closed, dropping command");
            return;
        }

        self.reply(event, &format!("Executed `{}`.", command)).await;
    }

    /// Lifecycle event -> system channel card, if a template is configured.
    async fn relay_system_event(&self, snap: &Snapshot, name: &str, ctx: TemplateContext) {
        let Some(template) = snap
            .format
            .system_events
            .get(name)
            .filter(|t| !t.is_empty())
        else {
            debug!("No template for system event '{}', not relaying", name);
            return;
        };

        let card = Card {
            author: Some(CardAuthor {
                name: "System".to_string(),
                icon_url: None,
            }),
            description: Some(render(template, &ctx)),
            color: Some(ChatColor::Blue.rgb()),
            ..Default::default()
        };

        self.deliver_card(snap.routing.system(), "system event", card)
            .await;
    }

    /// Context with the current server state keys.
    async fn base_context(&self, snap: &Snapshot) -> TemplateContext {
        let server = self.server.read().await.clone();
        TemplateContext::new(&snap.format.time, &snap.format.date)
            .with("Server.Name", &server.name)
            .with("Server.MapName", &server.map)
            .with("Server.CurPlayers", server.cur_players.to_string())
            .with("Server.MaxPlayers", server.max_players.to_string())
    }

    async fn player_context(&self, snap: &Snapshot, player: &PlayerIdentity) -> TemplateContext {
        self.base_context(snap)
            .await
            .with("Player.Name", &player.name)
            .with("Player.SteamID", player.steam_id.to_string())
            .with("Player.TeamName", player.team.name())
    }

    /// Deliver a card, treating a disabled channel as a logged no-op.
    async fn deliver_card(&self, channel: Option<u64>, purpose: &'static str, card: Card) {
        let Some(channel_id) = channel else {
            if self.disabled_warned.lock().unwrap().insert(purpose) {
                warn!(
                    "{}, dropping messages",
                    DeliveryError::ChannelDisabled { purpose }
                );
            }
            return;
        };

        if let Err(e) = self.platform.send_card(channel_id, card).await {
            error!("Failed to deliver {} message: {}", purpose, e);
        }
    }

    async fn reply(&self, event: &PlatformEvent, text: &str) {
        if let Err(e) = self
            .platform
            .reply(event.channel_id, event.message_id, text)
            .await
        {
            error!("Failed to send reply: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::load_config_str;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockSink {
        cards: Mutex<Vec<(u64, Card)>>,
        replies: Mutex<Vec<(u64, u64, String)>>,
    }

    #[async_trait]
    impl PlatformSink for MockSink {
        async fn send_card(&self, channel_id: u64, card: Card) -> DeliveryResult<()> {
            self.cards.lock().unwrap().push((channel_id, card));
            Ok(())
        }

        async fn reply(&self, channel_id: u64, message_id: u64, text: &str) -> DeliveryResult<()> {
            self.replies
                .lock()
                .unwrap()
                .push((channel_id, message_id, text.to_string()));
            Ok(())
        }
    }

    struct Harness {
        router: Router,
        sink: Arc<MockSink>,
        actions_rx: mpsc::UnboundedReceiver<GameAction>,
    }

    fn harness(hocon: &str) -> Harness {
        let config = load_config_str(hocon).unwrap();
        let sink = Arc::new(MockSink::default());
        let (game_tx, actions_rx) = mpsc::unbounded_channel();
        let server = Arc::new(RwLock::new(ServerInfo::from_config(&config)));
        let router = Router::new(
            Snapshot::from_config(&config),
            sink.clone(),
            game_tx,
            server,
        );
        Harness {
            router,
            sink,
            actions_rx,
        }
    }

    const BASE_CONFIG: &str = r#"
        server { name = "testserver", max_players = 16 }
        discord {
            token = "t"
            sync_channel_id = 100
            system_channel_id = 200
            command_channel_id = 300
            additional_read_channel_ids = [400]
        }
        sync { ignore_chat_triggers = false }
    "#;

    fn alice() -> PlayerIdentity {
        PlayerIdentity {
            name: "Alice".to_string(),
            steam_id: 76561198000000001,
            team: Team::Terrorist,
        }
    }

    fn platform_event(channel_id: u64, content: &str) -> PlatformEvent {
        PlatformEvent {
            channel_id,
            channel_name: "general".to_string(),
            message_id: 9001,
            author_name: "Bob".to_string(),
            author_id: 1,
            is_bot: false,
            is_webhook: false,
            role_color: None,
            content: content.to_string(),
            clean_content: content.to_string(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<GameAction>) -> Vec<GameAction> {
        let mut actions = Vec::new();
        while let Ok(action) = rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    #[tokio::test]
    async fn test_game_chat_becomes_card_on_primary_channel() {
        let h = harness(BASE_CONFIG);
        h.router
            .on_game_event(GameEvent::Chat {
                player: Some(alice()),
                command: "say".to_string(),
                text: "gg".to_string(),
            })
            .await;

        let cards = h.sink.cards.lock().unwrap();
        assert_eq!(cards.len(), 1);
        let (channel, card) = &cards[0];
        assert_eq!(*channel, 100);
        assert!(card.author.as_ref().unwrap().name.contains("Alice"));
        assert_eq!(card.description.as_deref(), Some("gg"));
        assert_eq!(card.color, Some(ChatColor::Orange.rgb()));
        // Default embed fields rendered from server state.
        assert!(card
            .fields
            .iter()
            .any(|(name, value)| name == "Server" && value == "testserver"));
    }

    #[tokio::test]
    async fn test_unknown_game_command_dropped() {
        let h = harness(BASE_CONFIG);
        h.router
            .on_game_event(GameEvent::Chat {
                player: Some(alice()),
                command: "kill".to_string(),
                text: "gg".to_string(),
            })
            .await;
        assert!(h.sink.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_team_chat_disabled_by_default() {
        let h = harness(BASE_CONFIG);
        h.router
            .on_game_event(GameEvent::Chat {
                player: Some(alice()),
                command: "say_team".to_string(),
                text: "flank left".to_string(),
            })
            .await;
        assert!(h.sink.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_primary_channel_is_noop() {
        let h = harness(
            r#"
            discord { token = "t", sync_channel_id = 0 }
            sync { ignore_chat_triggers = false }
            "#,
        );
        h.router
            .on_game_event(GameEvent::Chat {
                player: Some(alice()),
                command: "say".to_string(),
                text: "gg".to_string(),
            })
            .await;
        assert!(h.sink.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_platform_multiline_message_prints_header_and_block() {
        let mut h = harness(BASE_CONFIG);
        h.router
            .on_platform_event(platform_event(100, "hi\nthere"))
            .await;

        let actions = drain(&mut h.actions_rx);
        assert_eq!(actions.len(), 4);
        match &actions[0] {
            GameAction::PrintToChatAll(header) => {
                assert!(header.contains("[Discord - general]"));
                assert!(header.contains("Bob"));
                // Multi-line: the body is not inlined into the header.
                assert!(!header.contains("hi"));
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert_eq!(actions[1], GameAction::PrintToChatAll(" ".to_string()));
        assert_eq!(actions[2], GameAction::PrintToChatAll("hi".to_string()));
        assert_eq!(actions[3], GameAction::PrintToChatAll("there".to_string()));
    }

    #[tokio::test]
    async fn test_platform_single_line_is_inlined() {
        let mut h = harness(BASE_CONFIG);
        h.router.on_platform_event(platform_event(100, "hi")).await;

        let actions = drain(&mut h.actions_rx);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            GameAction::PrintToChatAll(line) => assert!(line.ends_with("hi")),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_channel_is_read_into_game_chat() {
        let mut h = harness(BASE_CONFIG);
        h.router.on_platform_event(platform_event(400, "news")).await;
        assert_eq!(drain(&mut h.actions_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_unmapped_channel_ignored() {
        let mut h = harness(BASE_CONFIG);
        h.router.on_platform_event(platform_event(999, "hi")).await;
        assert!(drain(&mut h.actions_rx).is_empty());
        assert!(h.sink.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bot_messages_ignored() {
        let mut h = harness(BASE_CONFIG);
        let mut event = platform_event(100, "hi");
        event.is_bot = true;
        h.router.on_platform_event(event).await;
        assert!(drain(&mut h.actions_rx).is_empty());
    }

    #[tokio::test]
    async fn test_remote_command_multiline_rejected() {
        let mut h = harness(BASE_CONFIG);
        h.router
            .on_platform_event(platform_event(300, "mp_restartgame 1\nsay hax"))
            .await;

        // Rejected with a user-visible reply, nothing executed.
        let replies = h.sink.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].2.contains("single non-blank line"));
        assert!(drain(&mut h.actions_rx).is_empty());
    }

    #[tokio::test]
    async fn test_remote_command_executes_and_acknowledges() {
        let mut h = harness(BASE_CONFIG);
        h.router
            .on_platform_event(platform_event(300, "mp_restartgame 1"))
            .await;

        let actions = drain(&mut h.actions_rx);
        assert_eq!(
            actions,
            vec![GameAction::ExecuteCommand("mp_restartgame 1".to_string())]
        );
        let replies = h.sink.replies.lock().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, 300);
        assert_eq!(replies[0].1, 9001);
        assert!(replies[0].2.contains("mp_restartgame 1"));
    }

    #[tokio::test]
    async fn test_remote_command_prefix_required() {
        let mut h = harness(
            r#"
            discord {
                token = "t"
                sync_channel_id = 100
                command_channel_id = 300
                command_prefix = "!"
            }
            "#,
        );

        h.router
            .on_platform_event(platform_event(300, "mp_restartgame 1"))
            .await;
        {
            let replies = h.sink.replies.lock().unwrap();
            assert!(replies[0].2.contains("must start with"));
        }
        assert!(drain(&mut h.actions_rx).is_empty());

        h.router
            .on_platform_event(platform_event(300, "!mp_restartgame 1"))
            .await;
        let actions = drain(&mut h.actions_rx);
        assert_eq!(
            actions,
            vec![GameAction::ExecuteCommand("mp_restartgame 1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_system_event_uses_template_and_counts() {
        let h = harness(BASE_CONFIG);
        h.router
            .on_game_event(GameEvent::PlayerConnected { player: alice() })
            .await;

        let cards = h.sink.cards.lock().unwrap();
        assert_eq!(cards.len(), 1);
        let (channel, card) = &cards[0];
        assert_eq!(*channel, 200);
        assert_eq!(card.author.as_ref().unwrap().name, "System");
        assert_eq!(card.description.as_deref(), Some("Alice connected (1/16)"));
    }

    #[tokio::test]
    async fn test_system_event_without_template_not_relayed() {
        let h = harness(
            r#"
            discord { token = "t", sync_channel_id = 100, system_channel_id = 200 }
            format { system_events { player_connect = "" } }
            "#,
        );
        h.router
            .on_game_event(GameEvent::PlayerConnected { player: alice() })
            .await;
        assert!(h.sink.cards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_map_change_updates_server_state() {
        let h = harness(BASE_CONFIG);
        h.router
            .on_game_event(GameEvent::MapChanged {
                map: "de_inferno".to_string(),
            })
            .await;

        let cards = h.sink.cards.lock().unwrap();
        assert_eq!(
            cards[0].1.description.as_deref(),
            Some("Changed map to de_inferno")
        );
    }

    #[tokio::test]
    async fn test_disconnect_never_underflows() {
        let h = harness(BASE_CONFIG);
        h.router
            .on_game_event(GameEvent::PlayerDisconnected { player: alice() })
            .await;
        let cards = h.sink.cards.lock().unwrap();
        assert_eq!(
            cards[0].1.description.as_deref(),
            Some("Alice disconnected (0/16)")
        );
    }

    #[tokio::test]
    async fn test_reload_swaps_snapshot_atomically() {
        let h = harness(BASE_CONFIG);

        let updated = load_config_str(
            r#"
            discord { token = "t", sync_channel_id = 100 }
            sync { ignore_chat_triggers = false, trigger = "!" }
            "#,
        )
        .unwrap();
        h.router.reload(Snapshot::from_config(&updated)).await;

        // Without the trigger prefix the message no longer relays.
        h.router
            .on_game_event(GameEvent::Chat {
                player: Some(alice()),
                command: "say".to_string(),
                text: "gg".to_string(),
            })
            .await;
        assert!(h.sink.cards.lock().unwrap().is_empty());

        h.router
            .on_game_event(GameEvent::Chat {
                player: Some(alice()),
                command: "say".to_string(),
                text: "!gg".to_string(),
            })
            .await;
        let cards = h.sink.cards.lock().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].1.description.as_deref(), Some("gg"));
    }
}
