//! Command parsing for message text.
//!
//! A command is the first word of a message when it starts with one of the
//! configured prefixes: `/setbio@warden_bot He is such a cool person`.
//! The optional `@username` suffix addresses the command to one bot when
//! several share a group.

/// Default prefixes accepted in front of a command name.
pub const DEFAULT_PREFIXES: &[char] = &['/'];

/// A parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Lowercased command name without prefix or mention.
    pub name: String,
    /// Username after `@`, if present.
    pub mention: Option<String>,
    /// Everything after the first whitespace run, newlines preserved.
    pub raw_args: String,
}

impl CommandInvocation {
    /// Parses `text` as a command, accepting any of `prefixes`.
    ///
    /// Returns `None` when the text does not start with a prefix or the
    /// command name is empty.
    pub fn parse(text: &str, prefixes: &[char]) -> Option<Self> {
        let mut chars = text.chars();
        let first = chars.next()?;
        if !prefixes.contains(&first) {
            return None;
        }

        let body = chars.as_str();
        let (head, rest) = match body.find(char::is_whitespace) {
            Some(idx) => (&body[..idx], body[idx..].trim_start()),
            None => (body, ""),
        };

        let (name, mention) = match head.split_once('@') {
            Some((name, mention)) => (name, Some(mention.to_string())),
            None => (head, None),
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_lowercase(),
            mention,
            raw_args: rest.to_string(),
        })
    }

    /// Whitespace-separated arguments.
    pub fn args(&self) -> Vec<&str> {
        self.raw_args.split_whitespace().collect()
    }

    /// Returns `true` when the command carries no mention or mentions
    /// `username` (case-insensitive).
    pub fn is_addressed_to(&self, username: &str) -> bool {
        match &self.mention {
            Some(m) => m.eq_ignore_ascii_case(username),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIXES: &[char] = &['/', '!'];

    #[test]
    fn test_parse_simple() {
        let cmd = CommandInvocation::parse("/start", PREFIXES).unwrap();
        assert_eq!(cmd.name, "start");
        assert_eq!(cmd.mention, None);
        assert!(cmd.args().is_empty());
    }

    #[test]
    fn test_parse_args_keep_newlines() {
        let cmd = CommandInvocation::parse("/setme line one\nline two", PREFIXES).unwrap();
        assert_eq!(cmd.name, "setme");
        assert_eq!(cmd.raw_args, "line one\nline two");
        assert_eq!(cmd.args(), vec!["line", "one", "line", "two"]);
    }

    #[test]
    fn test_parse_mention() {
        let cmd = CommandInvocation::parse("/Help@Warden_Bot bios", PREFIXES).unwrap();
        assert_eq!(cmd.name, "help");
        assert!(cmd.is_addressed_to("warden_bot"));
        assert!(!cmd.is_addressed_to("other_bot"));
        assert_eq!(cmd.args(), vec!["bios"]);
    }

    #[test]
    fn test_parse_alternate_prefix() {
        assert!(CommandInvocation::parse("!ping", PREFIXES).is_some());
        assert!(CommandInvocation::parse("!ping", DEFAULT_PREFIXES).is_none());
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert!(CommandInvocation::parse("hello", PREFIXES).is_none());
        assert!(CommandInvocation::parse("/", PREFIXES).is_none());
        assert!(CommandInvocation::parse("/@bot", PREFIXES).is_none());
        assert!(CommandInvocation::parse("", PREFIXES).is_none());
    }
}
