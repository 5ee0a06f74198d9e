//! GitHub REST implementation of [`Tracker`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};
use crate::traits::Tracker;
use crate::types::{Commit, Issue, IssueState};

/// Default GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Request timeout for tracker calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size when listing commits.
const COMMITS_PER_PAGE: u32 = 100;

/// Connection settings for a GitHub repository.
///
/// Every field is optional so a partially configured bot can still start;
/// missing values surface as [`TrackerError::NotConfigured`] on first use.
#[derive(Debug, Clone, Default)]
pub struct GitHubSettings {
    /// Personal access token.
    pub token: Option<String>,
    /// Repository owner (user or organisation).
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// API base URL; `None` means [`DEFAULT_API_URL`].
    pub api_url: Option<String>,
}

/// Tracker backed by the GitHub REST API.
pub struct GitHubTracker {
    client: reqwest::Client,
    settings: GitHubSettings,
}

/// Resolved credentials for a single request.
struct Target<'a> {
    token: &'a str,
    owner: &'a str,
    repo: &'a str,
}

impl GitHubTracker {
    /// Create a tracker. Fails only if the HTTP client cannot be built.
    pub fn new(settings: GitHubSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("pm-bot/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, settings })
    }

    fn base_url(&self) -> &str {
        self.settings
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    fn target(&self) -> Result<Target<'_>> {
        let token = self.settings.token.as_deref().filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(TrackerError::NotConfigured(
                "GitHub PAT (Personal Access Token) is not configured. Cannot perform GitHub operations."
                    .to_string(),
            ));
        };

        match (
            self.settings.owner.as_deref().filter(|o| !o.is_empty()),
            self.settings.repo.as_deref().filter(|r| !r.is_empty()),
        ) {
            (Some(owner), Some(repo)) => Ok(Target { token, owner, repo }),
            _ => Err(TrackerError::NotConfigured(
                "GITHUB_OWNER or GITHUB_REPO is not configured. Cannot perform GitHub operations."
                    .to_string(),
            )),
        }
    }

    fn repo_url(&self, target: &Target<'_>, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url(),
            target.owner,
            target.repo,
            path
        )
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitDetail,
    author: Option<Account>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    author: Option<Signature>,
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Account {
    login: Option<String>,
}

impl From<CommitEntry> for Commit {
    fn from(entry: CommitEntry) -> Self {
        let CommitEntry {
            sha,
            commit,
            author,
        } = entry;

        let author_name = commit
            .author
            .as_ref()
            .and_then(|a| a.name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| author.and_then(|a| a.login))
            .unwrap_or_else(|| "Unknown Author".to_string());

        let authored_at = commit
            .author
            .as_ref()
            .and_then(|a| a.date)
            .or_else(|| commit.committer.as_ref().and_then(|c| c.date));

        Commit {
            id: sha,
            message: commit.message,
            author_name,
            authored_at,
        }
    }
}

/// Turn a non-success response into a categorized error.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    warn!(status = status.as_u16(), message = %message, "GitHub API request failed");
    Err(TrackerError::from_status(status.as_u16(), message))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| TrackerError::Parse(e.to_string()))
}

#[async_trait]
impl Tracker for GitHubTracker {
    fn repository(&self) -> String {
        format!(
            "{}/{}",
            self.settings.owner.as_deref().unwrap_or("?"),
            self.settings.repo.as_deref().unwrap_or("?")
        )
    }

    fn check_configured(&self) -> Result<()> {
        self.target().map(|_| ())
    }

    async fn create_issue(&self, title: &str, body: &str) -> Result<Issue> {
        let target = self.target()?;
        let url = self.repo_url(&target, "/issues");
        debug!(url = %url, title = %title, "Creating issue");

        let response = self
            .client
            .post(&url)
            .bearer_auth(target.token)
            .json(&serde_json::json!({ "title": title, "body": body }))
            .send()
            .await?;

        decode(check_status(response).await?).await
    }

    async fn set_issue_state(&self, number: u64, state: IssueState) -> Result<Issue> {
        let target = self.target()?;
        let url = self.repo_url(&target, &format!("/issues/{}", number));
        debug!(url = %url, state = %state, "Updating issue state");

        let response = self
            .client
            .patch(&url)
            .bearer_auth(target.token)
            .json(&serde_json::json!({ "state": state }))
            .send()
            .await?;

        decode(check_status(response).await?).await
    }

    async fn add_assignee(&self, number: u64, username: &str) -> Result<()> {
        let target = self.target()?;
        let url = self.repo_url(&target, &format!("/issues/{}/assignees", number));
        debug!(url = %url, username = %username, "Adding assignee");

        let response = self
            .client
            .post(&url)
            .bearer_auth(target.token)
            .json(&serde_json::json!({ "assignees": [username] }))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn list_commits_since(&self, since: DateTime<Utc>) -> Result<Vec<Commit>> {
        let target = self.target()?;
        let url = self.repo_url(&target, "/commits");
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let per_page = COMMITS_PER_PAGE.to_string();
        debug!(url = %url, since = %since, "Listing commits");

        let response = self
            .client
            .get(&url)
            .bearer_auth(target.token)
            .query(&[("since", since.as_str()), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let response = check_status(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        let entries: Vec<CommitEntry> = decode(response).await?;
        Ok(entries.into_iter().map(Commit::from).collect())
    }
}
