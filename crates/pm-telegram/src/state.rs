//! Shared state for the Telegram bot.

use std::sync::Arc;

use pm_tracker::{GitHubTracker, MemoryTracker, Tracker};
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::digest::DigestService;
use crate::error::Result;
use crate::router::CommandRouter;
use crate::scheduler::parse_timezone;
use crate::session::SessionStore;
use crate::transport::Notifier;

/// Shared state for the bot, accessible across all handlers.
pub struct BotState {
    /// Routes plain messages; owns the per-chat sessions.
    router: CommandRouter,
    /// Builds and sends the commit digest.
    digest: Arc<DigestService>,
}

impl BotState {
    pub fn new(router: CommandRouter, digest: Arc<DigestService>) -> Self {
        Self { router, digest }
    }

    /// Wire the tracker, sessions and digest from configuration.
    pub fn from_config(config: &BotConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let tracker = build_tracker(config)?;
        let timezone = parse_timezone(&config.digest_timezone)?;

        let sessions = SessionStore::new(config.dialogue_timeout);
        let router = CommandRouter::new(Arc::clone(&tracker), sessions);
        let digest = Arc::new(DigestService::new(
            tracker,
            notifier,
            config.target_chat_id,
            timezone,
        ));

        Ok(Self::new(router, digest))
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    pub fn digest(&self) -> &Arc<DigestService> {
        &self.digest
    }
}

/// Choose the tracker implementation for this run.
pub fn build_tracker(config: &BotConfig) -> Result<Arc<dyn Tracker>> {
    if config.offline {
        warn!("Offline mode: using in-memory tracker, nothing is sent to GitHub");
        return Ok(Arc::new(MemoryTracker::new()));
    }

    let tracker = GitHubTracker::new(config.github.clone())?;
    info!(repository = %tracker.repository(), "GitHub tracker ready");
    Ok(Arc::new(tracker))
}

/// Create shared state wrapped in an Arc.
pub fn create_shared_state(config: &BotConfig, notifier: Arc<dyn Notifier>) -> Result<Arc<BotState>> {
    Ok(Arc::new(BotState::from_config(config, notifier)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::tests::RecordingNotifier;
    use teloxide::types::ChatId;

    #[tokio::test]
    async fn test_offline_state_routes_commands() {
        let config = BotConfig::new().with_offline(true);
        let state = create_shared_state(&config, Arc::new(RecordingNotifier::default())).unwrap();

        let reply = state.router().route(ChatId(1), "#todo Write docs").await.unwrap();
        assert!(reply.contains("#1 - Write docs"));
        assert_eq!(state.router().tracker().repository(), "local/memory");
    }

    #[test]
    fn test_invalid_timezone_fails() {
        let config = BotConfig::new()
            .with_offline(true)
            .with_digest_schedule("0 0 7 * * *", "Nowhere/Special");
        assert!(BotState::from_config(&config, Arc::new(RecordingNotifier::default())).is_err());
    }

    #[test]
    fn test_github_tracker_reports_missing_config_lazily() {
        let config = BotConfig::new();
        let state = BotState::from_config(&config, Arc::new(RecordingNotifier::default())).unwrap();
        assert!(state.router().tracker().check_configured().is_err());
        assert_eq!(state.digest().target(), None);
    }
}
