//! Configuration file parsing (HOCON format).
//!
//! The document is resolved into the `Hocon` value tree and converted to
//! a raw JSON value so schema migrations can run before deserialization
//! into [`Config`].

use std::path::Path;

use hocon::{Hocon, HoconLoader};
use serde_json::{Map, Value};

use crate::common::error::ConfigError;
use crate::config::migrate;
use crate::config::types::Config;

/// Load, migrate, and deserialize a HOCON config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let tree = HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::other(e.to_string()),
        })?
        .hocon()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;

    from_tree(tree)
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    let tree = HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .hocon()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;

    from_tree(tree)
}

fn from_tree(tree: Hocon) -> Result<Config, ConfigError> {
    let raw = hocon_to_value(tree)?;
    let migrated = migrate::migrate(raw)?;
    serde_json::from_value(migrated).map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}

/// Convert a resolved HOCON tree into a raw JSON value.
fn hocon_to_value(tree: Hocon) -> Result<Value, ConfigError> {
    Ok(match tree {
        Hocon::Null => Value::Null,
        Hocon::Boolean(b) => Value::Bool(b),
        Hocon::Integer(i) => Value::from(i),
        Hocon::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Hocon::String(s) => Value::String(s),
        Hocon::Array(items) => Value::Array(
            items
                .into_iter()
                .map(hocon_to_value)
                .collect::<Result<_, _>>()?,
        ),
        Hocon::Hash(fields) => {
            let mut object = Map::new();
            for (key, value) in fields {
                object.insert(key, hocon_to_value(value)?);
            }
            Value::Object(object)
        }
        Hocon::BadValue(e) => {
            return Err(ConfigError::ParseError {
                message: e.to_string(),
            })
        }
    })
}
