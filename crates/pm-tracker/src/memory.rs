//! In-memory tracker.
//!
//! Keeps issues in a map and records every call it receives. Used by the
//! bot's `--offline` mode and as the test double for routing and digest tests.

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::traits::Tracker;
use crate::types::{Commit, Issue, IssueState};

/// A call received by [`MemoryTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    CreateIssue { title: String, body: String },
    SetIssueState { number: u64, state: IssueState },
    AddAssignee { number: u64, username: String },
    ListCommitsSince { since: DateTime<Utc> },
}

#[derive(Debug, Default)]
struct Inner {
    issues: BTreeMap<u64, Issue>,
    assignees: BTreeMap<u64, Vec<String>>,
    commits: Vec<Commit>,
    calls: Vec<TrackerCall>,
    failures: VecDeque<TrackerError>,
}

/// Tracker that lives entirely in process memory.
#[derive(Debug)]
pub struct MemoryTracker {
    repository: String,
    not_configured: Option<String>,
    inner: Mutex<Inner>,
}

impl Default for MemoryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            repository: "local/memory".to_string(),
            not_configured: None,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// A tracker whose configuration check always fails with `reason`.
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            not_configured: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Seed an issue.
    pub async fn insert_issue(&self, number: u64, title: impl Into<String>, state: IssueState) {
        let issue = Issue {
            number,
            title: title.into(),
            state,
        };
        self.inner.lock().await.issues.insert(number, issue);
    }

    /// Seed a commit returned by [`Tracker::list_commits_since`].
    pub async fn push_commit(&self, commit: Commit) {
        self.inner.lock().await.commits.push(commit);
    }

    /// Make the next tracker operation fail with `error`.
    pub async fn fail_next(&self, error: TrackerError) {
        self.inner.lock().await.failures.push_back(error);
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<TrackerCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Current assignees of an issue.
    pub async fn assignees(&self, number: u64) -> Vec<String> {
        self.inner
            .lock()
            .await
            .assignees
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    /// Current state of an issue, if it exists.
    pub async fn issue(&self, number: u64) -> Option<Issue> {
        self.inner.lock().await.issues.get(&number).cloned()
    }
}

impl Inner {
    /// Record the call and pop a queued failure, if any.
    fn begin(&mut self, call: TrackerCall) -> Result<()> {
        debug!(?call, "Memory tracker call");
        self.calls.push(call);
        match self.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn missing(number: u64) -> TrackerError {
        TrackerError::NotFound(format!("issue #{} does not exist", number))
    }
}

#[async_trait]
impl Tracker for MemoryTracker {
    fn repository(&self) -> String {
        self.repository.clone()
    }

    fn check_configured(&self) -> Result<()> {
        match &self.not_configured {
            Some(reason) => Err(TrackerError::NotConfigured(reason.clone())),
            None => Ok(()),
        }
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<Issue> {
        self.check_configured()?;
        let mut inner = self.inner.lock().await;
        inner.begin(TrackerCall::CreateIssue {
            title: title.to_string(),
            body: body.to_string(),
        })?;

        let number = inner.issues.keys().next_back().map_or(1, |n| n + 1);
        let issue = Issue {
            number,
            title: title.to_string(),
            state: IssueState::Open,
        };
        inner.issues.insert(number, issue.clone());
        Ok(issue)
    }

    async fn set_issue_state(&self, number: u64, state: IssueState) -> Result<Issue> {
        self.check_configured()?;
        let mut inner = self.inner.lock().await;
        inner.begin(TrackerCall::SetIssueState { number, state })?;

        let issue = inner
            .issues
            .get_mut(&number)
            .ok_or_else(|| Inner::missing(number))?;
        issue.state = state;
        Ok(issue.clone())
    }

    async fn add_assignee(&self, number: u64, username: &str) -> Result<()> {
        self.check_configured()?;
        let mut inner = self.inner.lock().await;
        inner.begin(TrackerCall::AddAssignee {
            number,
            username: username.to_string(),
        })?;

        if !inner.issues.contains_key(&number) {
            return Err(Inner::missing(number));
        }
        let assignees = inner.assignees.entry(number).or_default();
        if !assignees.iter().any(|a| a == username) {
            assignees.push(username.to_string());
        }
        Ok(())
    }

    async fn list_commits_since(&self, since: DateTime<Utc>) -> Result<Vec<Commit>> {
        self.check_configured()?;
        let mut inner = self.inner.lock().await;
        inner.begin(TrackerCall::ListCommitsSince { since })?;

        Ok(inner
            .commits
            .iter()
            .filter(|c| c.authored_at.map_or(true, |at| at >= since))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_assigns_sequential_numbers() {
        let tracker = MemoryTracker::new();
        tracker.insert_issue(7, "Existing", IssueState::Open).await;

        let issue = tracker.create_issue("New", "body").await.unwrap();
        assert_eq!(issue.number, 8);
        assert_eq!(tracker.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_queued_failure_is_returned_once() {
        let tracker = MemoryTracker::new();
        tracker.insert_issue(1, "One", IssueState::Open).await;
        tracker
            .fail_next(TrackerError::Forbidden("nope".to_string()))
            .await;

        let first = tracker.set_issue_state(1, IssueState::Closed).await;
        assert!(matches!(first, Err(TrackerError::Forbidden(_))));

        let second = tracker.set_issue_state(1, IssueState::Closed).await.unwrap();
        assert_eq!(second.state, IssueState::Closed);
        assert_eq!(tracker.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unconfigured_records_no_calls() {
        let tracker = MemoryTracker::unconfigured("GITHUB_PAT is not configured");
        let err = tracker.add_assignee(1, "alice").await.unwrap_err();

        assert!(matches!(err, TrackerError::NotConfigured(_)));
        assert!(tracker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_commits_filters_by_date() {
        let tracker = MemoryTracker::new();
        let now = Utc::now();
        tracker
            .push_commit(Commit {
                id: "old".to_string(),
                message: "old".to_string(),
                author_name: "a".to_string(),
                authored_at: Some(now - Duration::days(3)),
            })
            .await;
        tracker
            .push_commit(Commit {
                id: "new".to_string(),
                message: "new".to_string(),
                author_name: "a".to_string(),
                authored_at: Some(now),
            })
            .await;

        let commits = tracker
            .list_commits_since(now - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].id, "new");
    }
}
