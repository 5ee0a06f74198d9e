//! Issue tracker capability for the project manager bot.
//!
//! The bot talks to its issue tracker only through the [`Tracker`] trait.
//! Two implementations are provided:
//!
//! - [`GitHubTracker`]: the GitHub REST API (issues, assignees, commits)
//! - [`MemoryTracker`]: an in-process tracker for offline runs and tests
//!
//! # Example
//!
//! ```no_run
//! use pm_tracker::{GitHubSettings, GitHubTracker, Tracker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tracker = GitHubTracker::new(GitHubSettings {
//!         token: std::env::var("GITHUB_PAT").ok(),
//!         owner: Some("acme".to_string()),
//!         repo: Some("widgets".to_string()),
//!         api_url: None,
//!     })?;
//!
//!     let issue = tracker.create_issue("Fix login", "Created via Telegram Bot").await?;
//!     println!("#{} {}", issue.number, issue.title);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod github;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{ErrorCategory, Result, TrackerError};
pub use github::{GitHubSettings, GitHubTracker, DEFAULT_API_URL};
pub use memory::{MemoryTracker, TrackerCall};
pub use traits::Tracker;
pub use types::{Commit, Issue, IssueState};
