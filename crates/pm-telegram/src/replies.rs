//! User-facing reply texts.
//!
//! All replies are sent with HTML parse mode, so any text that came from the
//! user or the tracker goes through [`html_escape`].

use std::fmt;

use pm_tracker::{ErrorCategory, Issue, TrackerError};

pub const PROVIDE_TITLE: &str = "❗ Please provide a title.";
pub const INVALID_ISSUE_NUMBER: &str = "❗ Invalid issue number.";
pub const ENTER_VALID_NUMBER: &str = "❗ Please enter a valid number.";
pub const ASK_ISSUE_NUMBER: &str = "📝 Which issue number do you want to assign?";
pub const WELCOME: &str = "Welcome to Project Manager Bot! I am working now.";

/// Escape text for Telegram's HTML parse mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Usage text for the `#` triggers followed by the slash commands.
pub fn help(commands: &str) -> String {
    format!(
        "🚀 <b>Project Manager Bot</b>\n\
        ➕ <b>Create Issue:</b> <code>#todo &lt;Your issue&gt;</code>\n\
        📌 <b>Close Issue:</b> <code>#close &lt;Issue Number&gt;</code>\n\
        🔁 <b>Reopen Issue:</b> <code>#reopen &lt;Issue Number&gt;</code>\n\
        👤 <b>Assign User:</b> <code>#assign</code> and I'll guide you\n\
        <i>Example:</i>\n\
        #todo Fix login\n\
        #close 12\n\n\
        {}",
        html_escape(commands)
    )
}

pub fn ask_assignee(issue_number: u64) -> String {
    format!(
        "👤 Who should I assign to issue #{}? (GitHub username)",
        issue_number
    )
}

pub fn issue_created(issue: &Issue) -> String {
    format!(
        "✅ Created Issue:\n<b>#{} - {}</b>",
        issue.number,
        html_escape(&issue.title)
    )
}

pub fn issue_closed(number: u64, title: &str) -> String {
    format!("🔒 Closed Issue #{} - <b>{}</b>", number, html_escape(title))
}

pub fn issue_reopened(number: u64, title: &str) -> String {
    format!("♻️ Reopened Issue #{} - <b>{}</b>", number, html_escape(title))
}

pub fn assigned(username: &str, number: u64) -> String {
    format!(
        "✅ Assigned <b>{}</b> to issue #{}",
        html_escape(username),
        number
    )
}

pub fn unknown_command(text: &str) -> String {
    let command = text.split_whitespace().next().unwrap_or(text);
    format!(
        "Unknown command: {}\n\nUse /help to see available commands.",
        html_escape(command)
    )
}

/// The tracker operation a failure happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerAction {
    CreateIssue,
    CloseIssue(u64),
    ReopenIssue(u64),
    Assign { username: String, issue_number: u64 },
}

impl TrackerAction {
    fn is_assign(&self) -> bool {
        matches!(self, TrackerAction::Assign { .. })
    }
}

impl fmt::Display for TrackerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerAction::CreateIssue => write!(f, "issue creation"),
            TrackerAction::CloseIssue(n) => write!(f, "closing issue #{}", n),
            TrackerAction::ReopenIssue(n) => write!(f, "reopening issue #{}", n),
            TrackerAction::Assign {
                username,
                issue_number,
            } => write!(f, "assigning {} to issue #{}", username, issue_number),
        }
    }
}

/// Map a tracker failure to the reply shown in the originating chat.
pub fn tracker_failure(action: &TrackerAction, error: &TrackerError, repository: &str) -> String {
    let action_text = html_escape(&action.to_string());
    match error.category() {
        ErrorCategory::Configuration => {
            format!("❌ Configuration Error: {}", html_escape(&error.to_string()))
        }
        ErrorCategory::Unauthorized => format!(
            "❌ GitHub Error ({}): Bad credentials. Check GITHUB_PAT.",
            action_text
        ),
        ErrorCategory::Forbidden => format!(
            "❌ GitHub Error ({}): Permission denied. Check GITHUB_PAT scopes for {}.",
            action_text,
            html_escape(repository)
        ),
        ErrorCategory::NotFound => format!(
            "❌ GitHub Error ({}): Resource not found (repository, issue, or user). \
            Check GITHUB_OWNER/REPO and input.",
            action_text
        ),
        ErrorCategory::Unprocessable if action.is_assign() => format!(
            "❌ GitHub Error ({}): Could not assign user. \
            They might not be a collaborator or the username is incorrect.",
            action_text
        ),
        ErrorCategory::Unprocessable | ErrorCategory::Other => format!(
            "❌ Couldn't {}. Error: {}",
            action_text,
            html_escape(&error.to_string())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a <b> & c"), "a &lt;b&gt; &amp; c");
    }

    #[test]
    fn test_unauthorized_mentions_credentials() {
        let reply = tracker_failure(
            &TrackerAction::CloseIssue(3),
            &TrackerError::Unauthorized("Bad credentials".into()),
            "acme/widgets",
        );
        assert!(reply.contains("Bad credentials. Check GITHUB_PAT."));
        assert!(reply.contains("closing issue #3"));
    }

    #[test]
    fn test_forbidden_names_repository() {
        let reply = tracker_failure(
            &TrackerAction::CreateIssue,
            &TrackerError::Forbidden("x".into()),
            "acme/widgets",
        );
        assert!(reply.contains("Permission denied"));
        assert!(reply.contains("acme/widgets"));
    }

    #[test]
    fn test_unprocessable_is_specific_only_for_assign() {
        let assign = TrackerAction::Assign {
            username: "alice".into(),
            issue_number: 4,
        };
        let err = TrackerError::Unprocessable("Validation Failed".into());

        let reply = tracker_failure(&assign, &err, "r");
        assert!(reply.contains("Could not assign user"));
        assert!(reply.contains("assigning alice to issue #4"));

        let reply = tracker_failure(&TrackerAction::CreateIssue, &err, "r");
        assert!(reply.starts_with("❌ Couldn't issue creation."));
    }

    #[test]
    fn test_configuration_error_is_reported_verbatim() {
        let reply = tracker_failure(
            &TrackerAction::CreateIssue,
            &TrackerError::NotConfigured("GITHUB_OWNER or GITHUB_REPO is not configured.".into()),
            "?/?",
        );
        assert_eq!(
            reply,
            "❌ Configuration Error: GITHUB_OWNER or GITHUB_REPO is not configured."
        );
    }

    #[test]
    fn test_user_text_is_escaped() {
        assert_eq!(assigned("<bob>", 2), "✅ Assigned <b>&lt;bob&gt;</b> to issue #2");
        assert!(unknown_command("/foo <x>").contains("/foo"));
    }
}
