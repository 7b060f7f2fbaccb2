//! Versioned config schema migrations.
//!
//! The persisted document carries a `schema_version` integer. Older
//! documents are upgraded through an explicit chain of pure migration
//! functions, applied sequentially on the raw JSON value before
//! deserialization. Documents newer than this build are rejected.

use serde_json::{json, Value};

use crate::common::error::ConfigError;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

type Migration = fn(Value) -> Value;

/// Migration chain: entry `(from, f)` upgrades `from` to `from + 1`.
const MIGRATIONS: &[(u32, Migration)] = &[(1, migrate_v1_to_v2), (2, migrate_v2_to_v3)];

/// Upgrade a raw config document to the current schema version.
pub fn migrate(mut doc: Value) -> Result<Value, ConfigError> {
    let mut version = schema_version(&doc);

    if version > CURRENT_SCHEMA_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    while version < CURRENT_SCHEMA_VERSION {
        let step = MIGRATIONS
            .iter()
            .find(|(from, _)| *from == version)
            .ok_or_else(|| ConfigError::MigrationError {
                message: format!("no migration from schema version {}", version),
            })?;

        tracing::info!(
            "Migrating config schema from version {} to {}",
            version,
            version + 1
        );
        doc = step.1(doc);
        doc["schema_version"] = json!(version + 1);
        version += 1;
    }

    Ok(doc)
}

/// Read the document's schema version; documents from before versioning
/// are treated as version 1.
fn schema_version(doc: &Value) -> u32 {
    doc.get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(1) as u32
}

/// v1 -> v2: the top-level `message_prefix` moved under `sync`, and
/// `server_output_format` became `format.chat_line`.
fn migrate_v1_to_v2(mut doc: Value) -> Value {
    if let Some(prefix) = doc.get("message_prefix").cloned() {
        doc["sync"]["message_prefix"] = prefix;
        doc.as_object_mut().map(|o| o.remove("message_prefix"));
    }
    if let Some(format) = doc.get("server_output_format").cloned() {
        doc["format"]["chat_line"] = format;
        doc.as_object_mut().map(|o| o.remove("server_output_format"));
    }
    doc
}

/// v2 -> v3: `discord.additional_channels` was renamed to
/// `discord.additional_read_channel_ids`; the system and remote-command
/// channel ids were introduced (disabled by default).
fn migrate_v2_to_v3(mut doc: Value) -> Value {
    let discord = &mut doc["discord"];
    if let Some(channels) = discord.get("additional_channels").cloned() {
        discord["additional_read_channel_ids"] = channels;
        discord.as_object_mut().map(|o| o.remove("additional_channels"));
    }
    if discord.get("system_channel_id").is_none() {
        discord["system_channel_id"] = json!(0);
    }
    if discord.get("command_channel_id").is_none() {
        discord["command_channel_id"] = json!(0);
    }
    doc
}
