//! Configuration validation.
//!
//! Hard errors reject the document (startup abort, or a reported failure
//! on reload). Degraded-but-usable settings only produce warnings: a
//! disabled channel id turns the corresponding feature into a no-op at
//! runtime instead of failing here.

use tracing::warn;

use crate::bridge::color::Rgb;
use crate::bridge::template::TEAM_COLOR_TOKEN;
use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.format.time.is_empty() {
        errors.push("format.time must not be empty".to_string());
    }
    if config.format.date.is_empty() {
        errors.push("format.date must not be empty".to_string());
    }
    if config.format.chat_line.is_empty() {
        errors.push("format.chat_line must not be empty".to_string());
    }

    // The embed color must be empty, a hex literal, or the team-color
    // token. Anything else would be silently dropped per message.
    let color = config.format.embed.color.trim();
    if !color.is_empty() && color != TEAM_COLOR_TOKEN && Rgb::parse_hex(color).is_none() {
        errors.push(format!(
            "format.embed.color '{}' is not a hex color or {}",
            color, TEAM_COLOR_TOKEN
        ));
    }

    if config.server.max_players == 0 {
        errors.push("server.max_players must be non-zero".to_string());
    }

    // Degraded features are warnings, not errors. A missing credential
    // disables the Discord side while the game host keeps running.
    if config.discord.token.is_empty() {
        warn!("discord.token is not set - running without Discord");
    }
    if config.discord.token == crate::config::types::PLACEHOLDER_TOKEN {
        warn!("discord.token is still the placeholder - running without Discord");
    }
    if config.discord.sync_channel_id == 0 {
        warn!("discord.sync_channel_id is not set - chat sync is disabled");
    }
    if !config.sync.message_prefix.is_empty() {
        warn!("sync.message_prefix is deprecated. Please use sync.trigger instead.");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::load_config_str;

    fn valid_config() -> Config {
        load_config_str(r#"discord { token = "abc", sync_channel_id = 1 }"#).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_token_is_not_fatal() {
        let mut config = valid_config();
        config.discord.token = String::new();
        assert!(validate_config(&config).is_ok());
        assert!(!config.discord.enabled());

        config.discord.token = crate::config::types::PLACEHOLDER_TOKEN.to_string();
        assert!(validate_config(&config).is_ok());
        assert!(!config.discord.enabled());
    }

    #[test]
    fn test_zero_sync_channel_is_not_fatal() {
        let mut config = valid_config();
        config.discord.sync_channel_id = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_embed_color_fails() {
        let mut config = valid_config();
        config.format.embed.color = "reddish".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_hex_and_token_colors_pass() {
        let mut config = valid_config();
        config.format.embed.color = "#e1af37".to_string();
        assert!(validate_config(&config).is_ok());

        config.format.embed.color = TEAM_COLOR_TOKEN.to_string();
        assert!(validate_config(&config).is_ok());

        config.format.embed.color = String::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_chat_line_fails() {
        let mut config = valid_config();
        config.format.chat_line = String::new();
        assert!(validate_config(&config).is_err());
    }
}
