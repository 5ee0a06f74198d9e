//! Daily commit digest.
//!
//! The digest lists the repository's commits from the last 24 hours and posts
//! them to the configured target chat. It runs from the scheduler and from
//! `/summary`, and shares no state with message routing.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use pm_tracker::{Commit, ErrorCategory, Tracker};
use teloxide::types::ChatId;
use tracing::{error, info, warn};

use crate::error::{BotError, Result};
use crate::replies::html_escape;
use crate::transport::{Notifier, TransportFailure};

/// How far back the digest looks.
pub const DIGEST_WINDOW_HOURS: i64 = 24;

const HEADER: &str = "🗓️ <b>Daily Commit Summary (Last 24 Hours)</b>\n\n";
const NO_ACTIVITY: &str = "No new commits in the last 24 hours. 😴";

/// Telegram rejects messages over 4096 UTF-16 code units; keep some headroom.
pub const MESSAGE_LIMIT: usize = 4000;

/// Result of one digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestOutcome {
    /// Digest delivered with this many commits.
    Sent { commits: usize },
    /// No target chat configured; nothing was sent.
    NoTarget,
    /// The tracker is not configured; the target was told so.
    NotConfigured,
    /// Fetching or sending failed; the target was told so when possible.
    Failed,
}

/// Builds and delivers the commit digest.
pub struct DigestService {
    tracker: Arc<dyn Tracker>,
    notifier: Arc<dyn Notifier>,
    target: Option<ChatId>,
    timezone: Tz,
}

impl DigestService {
    pub fn new(
        tracker: Arc<dyn Tracker>,
        notifier: Arc<dyn Notifier>,
        target: Option<ChatId>,
        timezone: Tz,
    ) -> Self {
        Self {
            tracker,
            notifier,
            target,
            timezone,
        }
    }

    /// The configured destination chat.
    pub fn target(&self) -> Option<ChatId> {
        self.target
    }

    /// Build and send the digest for the window ending at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> DigestOutcome {
        let Some(target) = self.target else {
            error!("TARGET_CHAT_ID not set. Cannot send daily commit summary.");
            return DigestOutcome::NoTarget;
        };

        if let Err(e) = self.tracker.check_configured() {
            error!(error = %e, "Configuration error for daily summary");
            let notice = format!(
                "⚠️ Cannot generate daily commit summary: {}",
                html_escape(&e.to_string())
            );
            if let Err(send_err) = self.notifier.send_html(target, &notice).await {
                error!(error = %send_err, "Failed to send configuration error notification");
            }
            return DigestOutcome::NotConfigured;
        }

        match self.fetch_and_send(target, now).await {
            Ok(commits) => {
                info!(chat_id = %target, commits, "Daily commit summary sent");
                DigestOutcome::Sent { commits }
            }
            Err(e) => {
                error!(error = %e, "Error fetching or sending daily commit summary");
                let notice = format!(
                    "⚠️ Error generating daily commit summary. Details: {}",
                    self.failure_detail(&e, target)
                );
                if let Err(send_err) = self.notifier.send_plain(target, &notice).await {
                    error!(error = %send_err, "Failed to send daily summary error notification");
                }
                DigestOutcome::Failed
            }
        }
    }

    async fn fetch_and_send(&self, target: ChatId, now: DateTime<Utc>) -> Result<usize> {
        let since = now - Duration::hours(DIGEST_WINDOW_HOURS);
        info!(since = %since, repository = %self.tracker.repository(), "Fetching commits");

        let commits = self.tracker.list_commits_since(since).await?;
        let message = format_digest(&commits, self.timezone);
        let parts = split_message(&message, MESSAGE_LIMIT);
        if parts.len() > 1 {
            info!(parts = parts.len(), "Digest split into several messages");
        }
        for part in &parts {
            self.notifier.send_html(target, part).await?;
        }
        Ok(commits.len())
    }

    fn failure_detail(&self, err: &BotError, target: ChatId) -> String {
        let repository = self.tracker.repository();
        match err {
            BotError::Tracker(e) => match e.category() {
                ErrorCategory::Unauthorized => format!(
                    "Failed to send daily summary for {}: Bad GitHub credentials.",
                    repository
                ),
                ErrorCategory::Forbidden => format!(
                    "Failed to send daily summary for {}: GitHub permission denied.",
                    repository
                ),
                ErrorCategory::NotFound => format!(
                    "Failed to send daily summary: GitHub Repository {} not found.",
                    repository
                ),
                _ => format!("Failed to send daily summary for {}: {}", repository, e),
            },
            BotError::Transport { failure, .. } => match failure {
                TransportFailure::TargetClosed => format!(
                    "Failed to send daily summary to {}: Telegram topic is closed or chat issue.",
                    target
                ),
                TransportFailure::ChatNotFound => format!(
                    "Failed to send daily summary to {}: Telegram chat not found.",
                    target
                ),
                TransportFailure::Other => {
                    format!("Failed to send daily summary for {}: {}", repository, err)
                }
            },
            other => {
                warn!(error = %other, "Unexpected digest error");
                format!("Failed to send daily summary for {}: {}", repository, other)
            }
        }
    }
}

/// Render commits as the digest message (Telegram HTML).
pub fn format_digest(commits: &[Commit], timezone: Tz) -> String {
    let mut message = String::from(HEADER);

    if commits.is_empty() {
        message.push_str(NO_ACTIVITY);
        return message;
    }

    for commit in commits {
        let time = commit
            .authored_at
            .map(|at| {
                format!(
                    " (at {})",
                    at.with_timezone(&timezone).format("%I:%M %p")
                )
            })
            .unwrap_or_default();

        message.push_str(&format!(
            "🔨 <code>[{}]</code> <b>{}</b> - <i>{}</i>{}\n",
            html_escape(commit.short_id()),
            html_escape(commit.summary()),
            html_escape(&commit.author_name),
            time
        ));
    }

    message
}

/// Length as Telegram counts it.
fn telegram_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Split text into chunks of at most `limit` UTF-16 code units, breaking at
/// newlines. Each digest line carries balanced tags, so line-aligned chunks
/// stay valid HTML. A single line over the limit is cut at a char boundary.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if telegram_len(text) <= limit {
        return vec![text.to_owned()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = telegram_len(line);

        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        // Oversized line: hard split
        for ch in line.chars() {
            let ch_len = ch.len_utf16();
            if current_len + ch_len > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += ch_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
