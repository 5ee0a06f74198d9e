//! Per-chat dialogue sessions.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use teloxide::types::ChatId;
use tokio::sync::RwLock;
use tracing::debug;

/// Where a chat is in the assign dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogueStep {
    /// No dialogue in progress; messages are parsed as commands.
    #[default]
    Idle,
    /// `#assign` was sent; waiting for the issue number.
    AwaitingIssueNumber,
    /// Issue number collected; waiting for the username.
    AwaitingAssignee { issue_number: u64 },
}

impl DialogueStep {
    /// Whether the chat is mid-dialogue.
    pub fn is_active(&self) -> bool {
        !matches!(self, DialogueStep::Idle)
    }

    /// The collected issue number, if any.
    pub fn issue_number(&self) -> Option<u64> {
        match self {
            DialogueStep::AwaitingAssignee { issue_number } => Some(*issue_number),
            DialogueStep::Idle | DialogueStep::AwaitingIssueNumber => None,
        }
    }
}

/// A chat's session record.
#[derive(Debug, Clone)]
pub struct ChatSession {
    /// Current dialogue step.
    pub step: DialogueStep,
    /// When the step last changed.
    pub updated_at: Instant,
}

impl ChatSession {
    /// A fresh idle session.
    pub fn new() -> Self {
        Self {
            step: DialogueStep::Idle,
            updated_at: Instant::now(),
        }
    }

    /// Whether an in-progress dialogue has been abandoned for longer than `timeout`.
    pub fn is_expired(&self, timeout: Option<Duration>) -> bool {
        match timeout {
            Some(timeout) => self.step.is_active() && self.updated_at.elapsed() > timeout,
            None => false,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyed store of chat sessions.
///
/// Sessions are created lazily and live for the process lifetime. There is no
/// versioning: concurrent writers for one chat resolve as last-write-wins.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ChatId, ChatSession>>,
    /// Abandoned dialogues older than this are reset; `None` keeps them forever.
    timeout: Option<Duration>,
}

impl SessionStore {
    /// Create a store with the given dialogue timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Current step for a chat, resetting it first if the dialogue expired.
    pub async fn step(&self, chat_id: ChatId) -> DialogueStep {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&chat_id) {
                None => return DialogueStep::Idle,
                Some(session) if !session.is_expired(self.timeout) => return session.step,
                Some(_) => {}
            }
        }

        debug!(chat_id = %chat_id, "Dialogue expired, resetting session");
        self.reset(chat_id).await;
        DialogueStep::Idle
    }

    /// Move a chat to `step`.
    pub async fn set_step(&self, chat_id: ChatId, step: DialogueStep) {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(chat_id).or_default();
        session.step = step;
        session.updated_at = Instant::now();
    }

    /// Return a chat to the initial idle state.
    pub async fn reset(&self, chat_id: ChatId) {
        self.set_step(chat_id, DialogueStep::Idle).await;
    }

    /// Snapshot of a chat's session, if one was created.
    pub async fn get(&self, chat_id: ChatId) -> Option<ChatSession> {
        self.sessions.read().await.get(&chat_id).cloned()
    }

    /// Number of chats with a session record.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no chat has a session yet.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let session = ChatSession::new();
        assert_eq!(session.step, DialogueStep::Idle);
        assert_eq!(session.step.issue_number(), None);
        assert!(!session.is_expired(Some(Duration::ZERO)));
    }

    #[test]
    fn test_issue_number_only_while_awaiting_assignee() {
        assert_eq!(DialogueStep::AwaitingIssueNumber.issue_number(), None);
        assert_eq!(
            DialogueStep::AwaitingAssignee { issue_number: 9 }.issue_number(),
            Some(9)
        );
    }

    #[tokio::test]
    async fn test_unknown_chat_is_idle_without_creating_session() {
        let store = SessionStore::default();
        assert_eq!(store.step(ChatId(1)).await, DialogueStep::Idle);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_are_per_chat() {
        let store = SessionStore::default();
        store
            .set_step(ChatId(1), DialogueStep::AwaitingIssueNumber)
            .await;

        assert_eq!(store.step(ChatId(1)).await, DialogueStep::AwaitingIssueNumber);
        assert_eq!(store.step(ChatId(2)).await, DialogueStep::Idle);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_dialogue_resets_to_idle() {
        let store = SessionStore::new(Some(Duration::from_millis(1)));
        store
            .set_step(ChatId(1), DialogueStep::AwaitingAssignee { issue_number: 4 })
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.step(ChatId(1)).await, DialogueStep::Idle);
        let session = store.get(ChatId(1)).await.unwrap();
        assert_eq!(session.step, DialogueStep::Idle);
    }

    #[tokio::test]
    async fn test_no_timeout_keeps_dialogue() {
        let store = SessionStore::new(None);
        store
            .set_step(ChatId(1), DialogueStep::AwaitingIssueNumber)
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(store.step(ChatId(1)).await, DialogueStep::AwaitingIssueNumber);
    }
}
