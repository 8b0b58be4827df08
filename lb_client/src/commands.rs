//! Command parsing for the plain (line-oriented) client mode.

use std::fmt;
use uuid::Uuid;

/// A top-level client command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the front-page feed.
    Feed,
    /// Open a post's detail view.
    Open(Uuid),
    /// Compose a new post.
    Post,
    /// Comment on the currently open post.
    Comment(String),
    /// Search posts.
    Search(String),
    /// Create a group.
    Group,
    /// Start the sign-in flow.
    Login,
    /// Start the sign-up flow.
    Register,
    /// Log out and clear local state.
    Logout,
    /// Show the current user.
    Me,
    /// Show the current user's bookmarks.
    Bookmarks,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Open command missing or carrying a malformed post identifier.
    InvalidPostId(String),
    /// Comment command missing its body.
    CommentMissingBody,
    /// Search command missing its query.
    SearchMissingQuery,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPostId(value) => write!(
                f,
                "Invalid post id '{}'. Use the post's uuid (e.g., 'open 8f14e45f-ea2a-4d36-9c6e-0b7f3f9f2a01')",
                value
            ),
            Self::CommentMissingBody => {
                write!(f, "Comment requires a body (e.g., 'comment nice find')")
            }
            Self::SearchMissingQuery => {
                write!(f, "Search requires a query (e.g., 'search rust')")
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use lb_client::commands::{Command, parse_command};
///
/// assert!(matches!(parse_command("feed"), Ok(Command::Feed)));
/// assert!(matches!(parse_command("logout"), Ok(Command::Logout)));
/// assert!(matches!(parse_command("search rust"), Ok(Command::Search(_))));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "feed" => return Ok(Command::Feed),
        "post" => return Ok(Command::Post),
        "group" => return Ok(Command::Group),
        "login" => return Ok(Command::Login),
        "register" => return Ok(Command::Register),
        "logout" => return Ok(Command::Logout),
        "me" => return Ok(Command::Me),
        "bookmarks" => return Ok(Command::Bookmarks),
        "help" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    // Parse multi-word commands
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"open") => parse_open_command(&parts),
        Some(&"comment") => match trimmed.strip_prefix("comment").map(str::trim) {
            Some(body) if !body.is_empty() => Ok(Command::Comment(body.to_string())),
            _ => Err(ParseError::CommentMissingBody),
        },
        Some(&"search") => match trimmed.strip_prefix("search").map(str::trim) {
            Some(query) if !query.is_empty() => Ok(Command::Search(query.to_string())),
            _ => Err(ParseError::SearchMissingQuery),
        },
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse an open command: "open UUID"
fn parse_open_command(parts: &[&str]) -> Result<Command, ParseError> {
    match parts.get(1) {
        Some(value) => value
            .parse::<Uuid>()
            .map(Command::Open)
            .map_err(|_| ParseError::InvalidPostId((*value).to_string())),
        None => Err(ParseError::InvalidPostId(String::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_word_commands() {
        assert!(matches!(parse_command("feed"), Ok(Command::Feed)));
        assert!(matches!(parse_command("  login "), Ok(Command::Login)));
        assert!(matches!(parse_command("exit"), Ok(Command::Quit)));
    }

    #[test]
    fn parses_open_with_uuid() {
        let command = parse_command("open 8f14e45f-ea2a-4d36-9c6e-0b7f3f9f2a01").unwrap();
        assert!(matches!(command, Command::Open(_)));
    }

    #[test]
    fn rejects_open_with_bad_id() {
        assert!(matches!(
            parse_command("open 42"),
            Err(ParseError::InvalidPostId(_))
        ));
        assert!(matches!(
            parse_command("open"),
            Err(ParseError::InvalidPostId(_))
        ));
    }

    #[test]
    fn comment_keeps_its_full_body() {
        let command = parse_command("comment nice find, thanks").unwrap();
        assert_eq!(
            command,
            Command::Comment("nice find, thanks".to_string())
        );
    }

    #[test]
    fn comment_without_body_is_an_error() {
        assert_eq!(
            parse_command("comment   "),
            Err(ParseError::CommentMissingBody)
        );
    }

    #[test]
    fn search_requires_a_query() {
        assert_eq!(
            parse_command("search rust async"),
            Ok(Command::Search("rust async".to_string()))
        );
        assert_eq!(parse_command("search"), Err(ParseError::SearchMissingQuery));
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert!(matches!(
            parse_command("frobnicate"),
            Err(ParseError::UnrecognizedCommand(_))
        ));
    }
}
