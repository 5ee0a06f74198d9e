//! Error types for the Telegram bot.

use pm_tracker::TrackerError;
use thiserror::Error;

use crate::transport::TransportFailure;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Set the BOT_TOKEN environment variable.")]
    NoToken,

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// A setting has an unusable value.
    #[error("Invalid configuration for {setting}: {reason}")]
    InvalidConfig {
        setting: &'static str,
        reason: String,
    },

    /// Tracker operation failed.
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Sending a message through Telegram failed.
    #[error("Telegram error: {message}")]
    Transport {
        failure: TransportFailure,
        message: String,
    },
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

impl From<teloxide::RequestError> for BotError {
    fn from(e: teloxide::RequestError) -> Self {
        BotError::Transport {
            failure: TransportFailure::classify(&e),
            message: e.to_string(),
        }
    }
}
