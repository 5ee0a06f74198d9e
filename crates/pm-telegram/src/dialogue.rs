//! The multi-step "assign user to issue" dialogue.
//!
//! ```text
//! Idle --#assign--> AwaitingIssueNumber --valid number--> AwaitingAssignee(n)
//!                        ^    |                                  |
//!                        +----+ invalid number                   | any text
//!                                                                v
//!                                                   add_assignee(n, text); Idle
//! ```

use pm_tracker::Tracker;
use teloxide::types::ChatId;
use tracing::{info, warn};

use crate::parser::parse_issue_number;
use crate::replies::{self, TrackerAction};
use crate::session::{DialogueStep, SessionStore};

/// Drives the assign dialogue for one chat.
pub struct AssignDialogue<'a> {
    sessions: &'a SessionStore,
    tracker: &'a dyn Tracker,
}

impl<'a> AssignDialogue<'a> {
    pub fn new(sessions: &'a SessionStore, tracker: &'a dyn Tracker) -> Self {
        Self { sessions, tracker }
    }

    /// Start the dialogue by asking for the issue number.
    pub async fn begin(&self, chat_id: ChatId) -> String {
        self.sessions
            .set_step(chat_id, DialogueStep::AwaitingIssueNumber)
            .await;
        info!(chat_id = %chat_id, "Assign dialogue started");
        replies::ASK_ISSUE_NUMBER.to_string()
    }

    /// Collect the issue number. Invalid input re-prompts without changing state.
    pub async fn collect_issue_number(&self, chat_id: ChatId, text: &str) -> String {
        let Some(issue_number) = parse_issue_number(text) else {
            return replies::ENTER_VALID_NUMBER.to_string();
        };

        self.sessions
            .set_step(chat_id, DialogueStep::AwaitingAssignee { issue_number })
            .await;
        replies::ask_assignee(issue_number)
    }

    /// Collect the username and assign it. The session always ends idle.
    pub async fn collect_assignee(&self, chat_id: ChatId, issue_number: u64, text: &str) -> String {
        let username = text.trim();
        let reply = match self.tracker.add_assignee(issue_number, username).await {
            Ok(()) => {
                info!(chat_id = %chat_id, issue = issue_number, username = %username, "Assigned user");
                replies::assigned(username, issue_number)
            }
            Err(e) => {
                warn!(chat_id = %chat_id, issue = issue_number, error = %e, "Assignment failed");
                let action = TrackerAction::Assign {
                    username: username.to_string(),
                    issue_number,
                };
                replies::tracker_failure(&action, &e, &self.tracker.repository())
            }
        };

        self.sessions.reset(chat_id).await;
        reply
    }
}
