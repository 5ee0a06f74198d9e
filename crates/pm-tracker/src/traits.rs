//! The tracker capability.
//!
//! The bot only ever talks to the issue tracker through [`Tracker`], so the
//! GitHub client can be swapped for [`crate::MemoryTracker`] in tests and
//! offline runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{Commit, Issue, IssueState};

/// Operations the bot needs from an issue tracker.
///
/// # Example
///
/// ```ignore
/// use pm_tracker::{IssueState, Tracker};
///
/// async fn close(tracker: &dyn Tracker, number: u64) -> pm_tracker::Result<String> {
///     let issue = tracker.set_issue_state(number, IssueState::Closed).await?;
///     Ok(issue.title)
/// }
/// ```
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Human-readable `owner/repo` label used in messages.
    fn repository(&self) -> String;

    /// Fails with [`crate::TrackerError::NotConfigured`] when credentials or
    /// repository identifiers are missing. Never performs a request.
    fn check_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Create a new issue.
    async fn create_issue(&self, title: &str, body: &str) -> Result<Issue>;

    /// Open or close an issue, returning its updated representation.
    async fn set_issue_state(&self, number: u64, state: IssueState) -> Result<Issue>;

    /// Add a user to an issue's assignees.
    async fn add_assignee(&self, number: u64, username: &str) -> Result<()>;

    /// Commits on the default branch since `since`, newest first.
    async fn list_commits_since(&self, since: DateTime<Utc>) -> Result<Vec<Commit>>;
}
