//! Per-direction relay policy.
//!
//! Decides whether a classified message crosses the bridge, and strips the
//! sync trigger prefix when one is configured. Checks run in a fixed order
//! and short-circuit on the first failure.

use tracing::warn;

use crate::bridge::classify::MessageKind;
use crate::config::types::SyncConfig;

/// Configured relay policy. Read-only snapshot, replaced wholesale on
/// config reload.
#[derive(Debug, Clone, Default)]
pub struct SyncPolicy {
    trigger: String,
    /// Deprecated predecessor of `trigger`; still honored, and takes
    /// precedence when set (matches historical behavior).
    legacy_prefix: String,
    team_chat: bool,
    console_chat: bool,
    ignore_chat_triggers: bool,
    chat_trigger_chars: String,
}

impl SyncPolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            trigger: config.trigger.clone(),
            legacy_prefix: config.message_prefix.clone(),
            team_chat: config.team_chat,
            console_chat: config.console_chat,
            ignore_chat_triggers: config.ignore_chat_triggers,
            chat_trigger_chars: config.chat_trigger_chars.clone(),
        }
    }

    /// Apply the policy to a classified message.
    ///
    /// Returns the content to relay (trigger-stripped and trimmed), or
    /// `None` when the message must not cross the bridge.
    pub fn apply(&self, kind: MessageKind, raw: &str) -> Option<String> {
        if kind == MessageKind::Unknown {
            return None;
        }
        if kind == MessageKind::ConsoleChat && !self.console_chat {
            return None;
        }
        if kind == MessageKind::TeamChat && !self.team_chat {
            return None;
        }

        // The server hands chat arguments fully quote-wrapped.
        let mut content = raw;
        if content.len() >= 2 && content.starts_with('"') && content.ends_with('"') {
            content = &content[1..content.len() - 1];
        }

        let mut content = content.trim().to_string();
        if content.is_empty() {
            return None;
        }

        if kind.is_game_chat() {
            if self.ignore_chat_triggers {
                if let Some(first) = content.chars().next() {
                    if self.chat_trigger_chars.contains(first) {
                        return None;
                    }
                }
            }

            content = self.apply_trigger(content)?;
            if content.is_empty() {
                return None;
            }
        }

        Some(content)
    }

    /// Enforce the sync trigger prefix for game chat, stripping it on
    /// acceptance. The deprecated legacy field wins when set.
    fn apply_trigger(&self, content: String) -> Option<String> {
        if !self.legacy_prefix.is_empty() {
            warn!("message_prefix is deprecated. Please use sync.trigger instead.");
            let stripped = content.strip_prefix(&self.legacy_prefix)?;
            return Some(stripped.trim().to_string());
        }

        if !self.trigger.is_empty() {
            let stripped = content.strip_prefix(&self.trigger)?;
            return Some(stripped.trim().to_string());
        }

        Some(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(config: SyncConfig) -> SyncPolicy {
        SyncPolicy::from_config(&config)
    }

    fn base_config() -> SyncConfig {
        SyncConfig {
            team_chat: false,
            console_chat: false,
            ignore_chat_triggers: true,
            chat_trigger_chars: "!/".to_string(),
            trigger: String::new(),
            message_prefix: String::new(),
        }
    }

    #[test]
    fn test_unknown_rejected() {
        let p = policy(base_config());
        assert_eq!(p.apply(MessageKind::Unknown, "hi"), None);
    }

    #[test]
    fn test_team_chat_opt_in() {
        let p = policy(base_config());
        assert_eq!(p.apply(MessageKind::TeamChat, "hi"), None);

        let mut config = base_config();
        config.team_chat = true;
        let p = policy(config);
        assert_eq!(p.apply(MessageKind::TeamChat, "hi"), Some("hi".to_string()));
    }

    #[test]
    fn test_console_chat_opt_in() {
        let p = policy(base_config());
        assert_eq!(p.apply(MessageKind::ConsoleChat, "hi"), None);

        let mut config = base_config();
        config.console_chat = true;
        let p = policy(config);
        assert_eq!(
            p.apply(MessageKind::ConsoleChat, "hi"),
            Some("hi".to_string())
        );
    }

    #[test]
    fn test_quote_wrapped_content_stripped() {
        let p = policy(base_config());
        assert_eq!(
            p.apply(MessageKind::PlayerChat, "\"hello there\""),
            Some("hello there".to_string())
        );
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        let p = policy(base_config());
        assert_eq!(p.apply(MessageKind::PlayerChat, ""), None);
        assert_eq!(p.apply(MessageKind::PlayerChat, "   "), None);
        assert_eq!(p.apply(MessageKind::PlayerChat, "\"\""), None);
    }

    #[test]
    fn test_chat_trigger_exclusion() {
        let p = policy(base_config());
        assert_eq!(p.apply(MessageKind::PlayerChat, "!rank"), None);
        assert_eq!(p.apply(MessageKind::PlayerChat, "/silent"), None);
        assert_eq!(
            p.apply(MessageKind::PlayerChat, "normal"),
            Some("normal".to_string())
        );
    }

    #[test]
    fn test_chat_trigger_exclusion_disabled() {
        let mut config = base_config();
        config.ignore_chat_triggers = false;
        let p = policy(config);
        assert_eq!(
            p.apply(MessageKind::PlayerChat, "!rank"),
            Some("!rank".to_string())
        );
    }

    #[test]
    fn test_sync_trigger_strip_and_reject() {
        let mut config = base_config();
        config.ignore_chat_triggers = false;
        config.trigger = "!".to_string();
        let p = policy(config);

        assert_eq!(
            p.apply(MessageKind::PlayerChat, "!hello"),
            Some("hello".to_string())
        );
        assert_eq!(p.apply(MessageKind::PlayerChat, "hello"), None);
    }

    #[test]
    fn test_trigger_only_message_rejected() {
        let mut config = base_config();
        config.ignore_chat_triggers = false;
        config.trigger = "!".to_string();
        let p = policy(config);
        assert_eq!(p.apply(MessageKind::PlayerChat, "!"), None);
        assert_eq!(p.apply(MessageKind::PlayerChat, "!   "), None);
    }

    #[test]
    fn test_legacy_prefix_takes_precedence() {
        let mut config = base_config();
        config.ignore_chat_triggers = false;
        config.trigger = "@".to_string();
        config.message_prefix = "#".to_string();
        let p = policy(config);

        // Legacy prefix wins: "@" no longer matches, "#" does.
        assert_eq!(p.apply(MessageKind::PlayerChat, "@hello"), None);
        assert_eq!(
            p.apply(MessageKind::PlayerChat, "#hello"),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_platform_chat_skips_game_checks() {
        // Trigger prefix and trigger-char exclusion only apply to game chat.
        let mut config = base_config();
        config.trigger = "!".to_string();
        let p = policy(config);

        assert_eq!(
            p.apply(MessageKind::PlatformChat, "hello"),
            Some("hello".to_string())
        );
        assert_eq!(
            p.apply(MessageKind::Broadcast, "!hello"),
            Some("!hello".to_string())
        );
    }
}
