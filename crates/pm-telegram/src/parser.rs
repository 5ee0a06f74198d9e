//! Parsing of `#` trigger messages.

/// Issue commands recognised in plain chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCommand {
    /// `#todo <title>`
    CreateIssue,
    /// `#close <number>`
    CloseIssue,
    /// `#reopen <number>`
    ReopenIssue,
    /// `#assign`, starts the assign dialogue.
    BeginAssign,
}

/// Triggers in registration order. No trigger is a prefix of another.
const TRIGGERS: [(&str, IssueCommand); 4] = [
    ("#todo", IssueCommand::CreateIssue),
    ("#close", IssueCommand::CloseIssue),
    ("#reopen", IssueCommand::ReopenIssue),
    ("#assign", IssueCommand::BeginAssign),
];

impl IssueCommand {
    /// The text prefix that selects this command.
    pub fn trigger(&self) -> &'static str {
        match self {
            IssueCommand::CreateIssue => "#todo",
            IssueCommand::CloseIssue => "#close",
            IssueCommand::ReopenIssue => "#reopen",
            IssueCommand::BeginAssign => "#assign",
        }
    }
}

/// A matched command and the text following its trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    pub command: IssueCommand,
    pub remainder: &'a str,
}

/// Match `text` against the registered triggers, case-insensitively.
///
/// Returns `None` when no trigger matches; such messages are ignored.
pub fn parse_command(text: &str) -> Option<ParsedCommand<'_>> {
    let text = text.trim();
    TRIGGERS.iter().find_map(|&(trigger, command)| {
        let head = text.get(..trigger.len())?;
        if !head.eq_ignore_ascii_case(trigger) {
            return None;
        }
        Some(ParsedCommand {
            command,
            remainder: text[trigger.len()..].trim(),
        })
    })
}

/// Parse a positive, base-10 issue number. A leading `#` is allowed.
pub fn parse_issue_number(text: &str) -> Option<u64> {
    let text = text.trim();
    let digits = text.strip_prefix('#').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_todo_with_title() {
        let parsed = parse_command("#todo Fix login").unwrap();
        assert_eq!(parsed.command, IssueCommand::CreateIssue);
        assert_eq!(parsed.remainder, "Fix login");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let parsed = parse_command("#CLOSE 12").unwrap();
        assert_eq!(parsed.command, IssueCommand::CloseIssue);
        assert_eq!(parsed.remainder, "12");

        let parsed = parse_command("  #ReOpen   7  ").unwrap();
        assert_eq!(parsed.command, IssueCommand::ReopenIssue);
        assert_eq!(parsed.remainder, "7");
    }

    #[test]
    fn test_parse_allows_empty_remainder() {
        let parsed = parse_command("#assign").unwrap();
        assert_eq!(parsed.command, IssueCommand::BeginAssign);
        assert_eq!(parsed.remainder, "");

        assert_eq!(parse_command("#todo   ").unwrap().remainder, "");
    }

    #[test]
    fn test_parse_ignores_other_text() {
        assert!(parse_command("hello there").is_none());
        assert!(parse_command("todo #todo").is_none());
        assert!(parse_command("#").is_none());
        assert!(parse_command("").is_none());
    }

    #[test]
    fn test_parse_multibyte_text_does_not_panic() {
        assert!(parse_command("été").is_none());
        assert!(parse_command("#tödo x").is_none());
    }

    #[test]
    fn test_trigger_matches_table() {
        for (trigger, command) in TRIGGERS {
            assert_eq!(command.trigger(), trigger);
        }
    }

    #[test]
    fn test_parse_issue_number() {
        assert_eq!(parse_issue_number("42"), Some(42));
        assert_eq!(parse_issue_number(" #42 "), Some(42));
        assert_eq!(parse_issue_number("0"), None);
        assert_eq!(parse_issue_number("-3"), None);
        assert_eq!(parse_issue_number("abc"), None);
        assert_eq!(parse_issue_number("12abc"), None);
        assert_eq!(parse_issue_number(""), None);
        assert_eq!(parse_issue_number("#"), None);
    }
}
