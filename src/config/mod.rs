//! Configuration parsing, migration, and validation.

pub mod env;
pub mod migrate;
pub mod parser;
pub mod types;
pub mod validate;

use crate::common::error::ConfigError;
use types::Config;

/// Load a config file, apply env overrides, and validate the result.
pub fn load_and_validate(path: &str) -> Result<Config, ConfigError> {
    let config = parser::load_config(path)?;
    let config = env::apply_env_overrides(config);
    validate::validate_config(&config)?;
    Ok(config)
}
