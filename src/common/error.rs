//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config migration failed: {message}")]
    MigrationError { message: String },

    #[error("Config schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Delivery errors for outbound messages.
///
/// These are always contained at the dispatch site: logged, the message
/// dropped, never propagated back to the event source.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to send message: {message}")]
    SendFailed { message: String },

    #[error("Channel for {purpose} is not configured")]
    ChannelDisabled { purpose: &'static str },
}

/// Result type alias for delivery operations.
pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;
