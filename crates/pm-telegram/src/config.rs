//! Bot configuration.

use std::time::Duration;

use pm_tracker::GitHubSettings;
use teloxide::types::ChatId;

use crate::error::{BotError, Result};

/// Default digest schedule: every day at 07:00 (seconds field first).
pub const DEFAULT_DIGEST_CRON: &str = "0 0 7 * * *";

/// Default timezone the digest schedule and commit times are shown in.
pub const DEFAULT_DIGEST_TIMEZONE: &str = "Asia/Kolkata";

/// Default lifetime of an abandoned assign dialogue.
pub const DEFAULT_DIALOGUE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Configuration for the bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token. Required to start.
    pub bot_token: Option<String>,
    /// GitHub credentials and repository.
    pub github: GitHubSettings,
    /// Chat that receives the daily digest.
    pub target_chat_id: Option<ChatId>,
    /// Cron expression for the digest.
    pub digest_cron: String,
    /// IANA timezone for the digest.
    pub digest_timezone: String,
    /// Abandoned dialogue timeout; `None` keeps dialogues until the next message.
    pub dialogue_timeout: Option<Duration>,
    /// Run the digest once right after startup.
    pub summary_on_startup: bool,
    /// Use the in-memory tracker instead of GitHub.
    pub offline: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            github: GitHubSettings::default(),
            target_chat_id: None,
            digest_cron: DEFAULT_DIGEST_CRON.to_string(),
            digest_timezone: DEFAULT_DIGEST_TIMEZONE.to_string(),
            dialogue_timeout: Some(DEFAULT_DIALOGUE_TIMEOUT),
            summary_on_startup: false,
            offline: false,
        }
    }
}

impl BotConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bot token.
    pub fn with_bot_token(mut self, token: impl Into<String>) -> Self {
        self.bot_token = Some(token.into());
        self
    }

    /// Sets the GitHub settings.
    pub fn with_github(mut self, github: GitHubSettings) -> Self {
        self.github = github;
        self
    }

    /// Sets the digest target chat.
    pub fn with_target_chat(mut self, chat_id: ChatId) -> Self {
        self.target_chat_id = Some(chat_id);
        self
    }

    /// Sets the digest schedule.
    pub fn with_digest_schedule(mut self, cron: impl Into<String>, timezone: impl Into<String>) -> Self {
        self.digest_cron = cron.into();
        self.digest_timezone = timezone.into();
        self
    }

    /// Sets the dialogue timeout. Zero disables expiry.
    pub fn with_dialogue_timeout(mut self, timeout: Duration) -> Self {
        self.dialogue_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Run the digest once on startup.
    pub fn with_summary_on_startup(mut self, enabled: bool) -> Self {
        self.summary_on_startup = enabled;
        self
    }

    /// Use the in-memory tracker.
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// The bot token, or [`BotError::NoToken`].
    pub fn require_token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(BotError::NoToken)
    }

    /// Non-fatal gaps in the configuration, to be logged at startup.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.offline {
            return warnings;
        }
        if is_blank(&self.github.token) {
            warnings.push("GITHUB_PAT is not defined. GitHub related features will fail.");
        }
        if is_blank(&self.github.owner) || is_blank(&self.github.repo) {
            warnings.push(
                "GITHUB_OWNER or GITHUB_REPO is not defined. GitHub features might fail or target the wrong repository.",
            );
        }
        if self.target_chat_id.is_none() {
            warnings.push("TARGET_CHAT_ID is not defined. Daily summaries will not be sent automatically.");
        }
        warnings
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
