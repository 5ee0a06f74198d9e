//! Routing of plain chat messages.
//!
//! [`CommandRouter::route`] is the single entry point for non-slash text. It
//! reads the chat's dialogue step and either parses the text as a `#` command
//! or forwards it to the assign dialogue. It returns the reply instead of
//! sending it, so the Telegram layer stays a thin shell.

use std::sync::Arc;

use pm_tracker::{IssueState, Tracker};
use teloxide::types::ChatId;
use tracing::{debug, info, warn};

use crate::dialogue::AssignDialogue;
use crate::parser::{parse_command, parse_issue_number, IssueCommand};
use crate::replies::{self, TrackerAction};
use crate::session::{DialogueStep, SessionStore};

/// Body attached to issues created from chat.
pub const ISSUE_BODY: &str = "Created via Telegram Bot";

/// Routes chat messages to issue commands and the assign dialogue.
pub struct CommandRouter {
    tracker: Arc<dyn Tracker>,
    sessions: SessionStore,
}

impl CommandRouter {
    pub fn new(tracker: Arc<dyn Tracker>, sessions: SessionStore) -> Self {
        Self { tracker, sessions }
    }

    pub fn tracker(&self) -> &Arc<dyn Tracker> {
        &self.tracker
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn dialogue(&self) -> AssignDialogue<'_> {
        AssignDialogue::new(&self.sessions, self.tracker.as_ref())
    }

    /// Handle one message. `None` means the message is ignored and no reply is sent.
    pub async fn route(&self, chat_id: ChatId, text: &str) -> Option<String> {
        let text = text.trim();

        match self.sessions.step(chat_id).await {
            DialogueStep::Idle => self.route_idle(chat_id, text).await,
            DialogueStep::AwaitingIssueNumber => {
                Some(self.dialogue().collect_issue_number(chat_id, text).await)
            }
            DialogueStep::AwaitingAssignee { issue_number } => Some(
                self.dialogue()
                    .collect_assignee(chat_id, issue_number, text)
                    .await,
            ),
        }
    }

    async fn route_idle(&self, chat_id: ChatId, text: &str) -> Option<String> {
        let Some(parsed) = parse_command(text) else {
            debug!(chat_id = %chat_id, "No trigger matched, ignoring message");
            return None;
        };

        info!(chat_id = %chat_id, command = ?parsed.command, "Issue command received");
        let reply = match parsed.command {
            IssueCommand::CreateIssue => self.create_issue(parsed.remainder).await,
            IssueCommand::CloseIssue => self.close_issue(parsed.remainder).await,
            IssueCommand::ReopenIssue => self.reopen_issue(parsed.remainder).await,
            IssueCommand::BeginAssign => self.dialogue().begin(chat_id).await,
        };
        Some(reply)
    }

    /// `#todo <title>`
    pub async fn create_issue(&self, title: &str) -> String {
        let title = title.trim();
        if title.is_empty() {
            return replies::PROVIDE_TITLE.to_string();
        }

        match self.tracker.create_issue(title, ISSUE_BODY).await {
            Ok(issue) => {
                info!(issue = issue.number, "Issue created");
                replies::issue_created(&issue)
            }
            Err(e) => {
                warn!(error = %e, "Issue creation failed");
                replies::tracker_failure(&TrackerAction::CreateIssue, &e, &self.tracker.repository())
            }
        }
    }

    /// `#close <number>`
    pub async fn close_issue(&self, number_text: &str) -> String {
        self.set_state(number_text, IssueState::Closed).await
    }

    /// `#reopen <number>`
    pub async fn reopen_issue(&self, number_text: &str) -> String {
        self.set_state(number_text, IssueState::Open).await
    }

    async fn set_state(&self, number_text: &str, state: IssueState) -> String {
        let Some(number) = parse_issue_number(number_text) else {
            return replies::INVALID_ISSUE_NUMBER.to_string();
        };

        let action = match state {
            IssueState::Closed => TrackerAction::CloseIssue(number),
            IssueState::Open => TrackerAction::ReopenIssue(number),
        };

        match self.tracker.set_issue_state(number, state).await {
            Ok(issue) => {
                info!(issue = number, state = %state, "Issue state updated");
                match state {
                    IssueState::Closed => replies::issue_closed(number, &issue.title),
                    IssueState::Open => replies::issue_reopened(number, &issue.title),
                }
            }
            Err(e) => {
                warn!(issue = number, error = %e, "Issue state update failed");
                replies::tracker_failure(&action, &e, &self.tracker.repository())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_tracker::{MemoryTracker, TrackerCall, TrackerError};

    fn router() -> (CommandRouter, Arc<MemoryTracker>) {
        let tracker = Arc::new(MemoryTracker::new());
        let router = CommandRouter::new(tracker.clone(), SessionStore::default());
        (router, tracker)
    }

    #[tokio::test]
    async fn test_plain_text_is_ignored() {
        let (router, tracker) = router();

        assert_eq!(router.route(ChatId(1), "good morning").await, None);
        assert_eq!(router.route(ChatId(1), "42").await, None);
        assert!(tracker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_issue_requires_title() {
        let (router, tracker) = router();

        for text in ["#todo", "#todo    ", "#TODO"] {
            let reply = router.route(ChatId(1), text).await.unwrap();
            assert_eq!(reply, replies::PROVIDE_TITLE);
        }
        assert_eq!(router.create_issue("   ").await, replies::PROVIDE_TITLE);
        assert!(tracker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_issue_reports_number_and_title() {
        let (router, tracker) = router();

        let reply = router.route(ChatId(1), "#todo Fix <login>").await.unwrap();
        assert_eq!(reply, "✅ Created Issue:\n<b>#1 - Fix &lt;login&gt;</b>");
        assert_eq!(
            tracker.calls().await,
            vec![TrackerCall::CreateIssue {
                title: "Fix <login>".to_string(),
                body: ISSUE_BODY.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_close_with_invalid_number_makes_no_call() {
        let (router, tracker) = router();

        assert_eq!(router.close_issue("abc").await, replies::INVALID_ISSUE_NUMBER);
        assert_eq!(router.close_issue("").await, replies::INVALID_ISSUE_NUMBER);
        assert_eq!(
            router.route(ChatId(1), "#reopen x").await.unwrap(),
            replies::INVALID_ISSUE_NUMBER
        );
        assert!(tracker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_close_and_reopen_use_returned_title() {
        let (router, tracker) = router();
        tracker.insert_issue(12, "Flaky test", IssueState::Open).await;

        let reply = router.route(ChatId(1), "#close 12").await.unwrap();
        assert_eq!(reply, "🔒 Closed Issue #12 - <b>Flaky test</b>");
        assert_eq!(tracker.issue(12).await.unwrap().state, IssueState::Closed);

        let reply = router.route(ChatId(1), "#reopen #12").await.unwrap();
        assert_eq!(reply, "♻️ Reopened Issue #12 - <b>Flaky test</b>");
        assert_eq!(tracker.issue(12).await.unwrap().state, IssueState::Open);
    }

    #[tokio::test]
    async fn test_unauthorized_reply_mentions_credentials() {
        let (router, tracker) = router();
        tracker
            .fail_next(TrackerError::Unauthorized("Bad credentials".into()))
            .await;

        let reply = router.route(ChatId(1), "#todo Anything").await.unwrap();
        assert!(reply.contains("Bad credentials. Check GITHUB_PAT."));
    }

    #[tokio::test]
    async fn test_unconfigured_tracker_reports_configuration_error() {
        let tracker = Arc::new(MemoryTracker::unconfigured(
            "GitHub PAT (Personal Access Token) is not configured.",
        ));
        let router = CommandRouter::new(tracker.clone(), SessionStore::default());

        let reply = router.route(ChatId(1), "#close 3").await.unwrap();
        assert!(reply.starts_with("❌ Configuration Error:"));
        assert!(tracker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_assign_trigger_starts_dialogue() {
        let (router, _tracker) = router();

        let reply = router.route(ChatId(1), "#Assign please").await.unwrap();
        assert_eq!(reply, replies::ASK_ISSUE_NUMBER);
        assert_eq!(
            router.sessions().step(ChatId(1)).await,
            DialogueStep::AwaitingIssueNumber
        );
    }

    #[tokio::test]
    async fn test_mid_dialogue_text_bypasses_parser() {
        let (router, tracker) = router();
        router.route(ChatId(1), "#assign").await;

        let reply = router.route(ChatId(1), "#todo not a command").await.unwrap();
        assert_eq!(reply, replies::ENTER_VALID_NUMBER);
        assert!(tracker.calls().await.is_empty());
    }
}
