//! Outbound message delivery over Telegram.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::{ApiError, RequestError};
use tracing::{error, warn};

use crate::error::{BotError, Result};

/// Why a send to Telegram failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// The forum topic is closed or the bot may not post there.
    TargetClosed,
    /// The chat does not exist or the bot is not a member.
    ChatNotFound,
    /// Anything else (network, parse errors, rate limits).
    Other,
}

impl TransportFailure {
    /// Classify a teloxide request error.
    pub fn classify(err: &RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::ChatNotFound) => TransportFailure::ChatNotFound,
            other => Self::classify_description(&other.to_string()),
        }
    }

    /// Classify from the API's error description.
    pub fn classify_description(description: &str) -> Self {
        let upper = description.to_ascii_uppercase();
        if upper.contains("TOPIC_CLOSED") {
            TransportFailure::TargetClosed
        } else if upper.contains("CHAT_NOT_FOUND") || upper.contains("CHAT NOT FOUND") {
            TransportFailure::ChatNotFound
        } else {
            TransportFailure::Other
        }
    }

    /// Operator-facing hint for the failure.
    pub fn hint(&self) -> &'static str {
        match self {
            TransportFailure::TargetClosed => {
                "Cannot send message because the target topic is closed or the bot is not allowed there. \
                Check the group's topic settings or TARGET_CHAT_ID."
            }
            TransportFailure::ChatNotFound => {
                "Chat not found. Is TARGET_CHAT_ID correct and is the bot a member of the chat?"
            }
            TransportFailure::Other => "Telegram request failed.",
        }
    }
}

/// Something that can deliver messages to a chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send text formatted with Telegram HTML.
    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<()>;

    /// Send text without any parse mode.
    async fn send_plain(&self, chat_id: ChatId, text: &str) -> Result<()>;
}

#[async_trait]
impl Notifier for Bot {
    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }

    async fn send_plain(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }
}

/// Reduce HTML-formatted text to plain text.
pub fn strip_html(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("Invalid tag pattern"));

    tag.replace_all(text, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Send an HTML reply, falling back to plain text once if Telegram rejected it
/// for a reason other than a closed topic or missing chat.
///
/// Failures are logged and never propagated.
pub async fn deliver(notifier: &dyn Notifier, chat_id: ChatId, html: &str) -> bool {
    let err = match notifier.send_html(chat_id, html).await {
        Ok(()) => return true,
        Err(e) => e,
    };

    let failure = match &err {
        BotError::Transport { failure, .. } => *failure,
        _ => TransportFailure::Other,
    };
    warn!(chat_id = %chat_id, error = %err, ?failure, hint = failure.hint(), "Failed to send reply");

    if failure != TransportFailure::Other {
        return false;
    }

    match notifier.send_plain(chat_id, &strip_html(html)).await {
        Ok(()) => true,
        Err(e) => {
            error!(chat_id = %chat_id, error = %e, "Plain-text fallback also failed");
            false
        }
    }
}
