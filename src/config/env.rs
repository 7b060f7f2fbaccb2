//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `TOWNCRIER_DISCORD_TOKEN` - Discord bot token
//! - `TOWNCRIER_SYNC_CHANNEL_ID` - primary sync channel id
//! - `TOWNCRIER_SERVER_NAME` - server display name
//! - `TOWNCRIER_CONFIG` - config file path

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "TOWNCRIER";

/// Apply environment variable overrides to a config.
///
/// This allows sensitive values like the bot token to be provided via
/// environment variables instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_DISCORD_TOKEN", ENV_PREFIX)) {
        config.discord.token = token;
    }

    if let Ok(id) = env::var(format!("{}_SYNC_CHANNEL_ID", ENV_PREFIX)) {
        if let Ok(id) = id.parse() {
            config.discord.sync_channel_id = id;
        }
    }

    if let Ok(name) = env::var(format!("{}_SERVER_NAME", ENV_PREFIX)) {
        config.server.name = name;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `TOWNCRIER_CONFIG`, otherwise returns "towncrier.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "towncrier.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "TOWNCRIER");
    }

    #[test]
    fn test_default_config_path() {
        // Only meaningful when the variable is unset in the test env.
        if env::var("TOWNCRIER_CONFIG").is_err() {
            assert_eq!(get_config_path(), "towncrier.conf");
        }
    }
}
