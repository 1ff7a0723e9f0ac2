//! Error types for Growth Assist.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
///
/// Rate limiting and step mismatches are deliberately absent: the limiter is
/// a boolean gate and out-of-order events are dropped silently. Neither is an
/// error condition.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send prompt on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Profile lookup failed on channel {name}: {reason}")]
    ProfileLookupFailed { name: String, reason: String },

    #[error("Invalid payload from channel: {0}")]
    InvalidPayload(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
