//! API error taxonomy.
//!
//! Four kinds of failure, with distinct handling:
//! client-side validation (no request is made), a structured server
//! rejection (per-field or non-field message arrays), and a
//! network/transport failure (no structured body). None of them are fatal:
//! call sites convert every variant into a single transient user-facing
//! message via [`ApiError::user_message`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Message shown when client-side validation blocks a submission.
pub const VALIDATION_MESSAGE: &str = "Please fill in all required fields";

/// Message shown for transport-level failures with no structured body.
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";

/// Errors produced by the HTTP layer and the services built on it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client-side validation failed; no request was made.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The server rejected the request with a structured error body.
    #[error("request rejected with status {status}")]
    Rejected {
        status: reqwest::StatusCode,
        body: ErrorBody,
    },

    /// Transport failure, or a response body that could not be decoded.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// The single user-facing message for this error.
    ///
    /// For server rejections the precedence is: non-field error, then the
    /// given fields in order, then the generic `fallback`.
    pub fn user_message(&self, fields: &[&str], fallback: &str) -> String {
        match self {
            Self::Validation(_) => VALIDATION_MESSAGE.to_string(),
            Self::Rejected { body, .. } => body.user_message(fields, fallback),
            Self::Network(_) => NETWORK_MESSAGE.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Client-side validation failures, keyed by field.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push((field.to_string(), message.to_string()));
    }

    /// Record a "required" failure when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|(field, _)| field.as_str())
    }

    /// `Ok(())` when no failures were recorded, otherwise `self`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field} {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{repr}")
    }
}

/// A structured error body from the REST backend.
///
/// Django REST error bodies are maps from field name to a list of
/// messages, with two special spellings: `non_field_errors` (a list) and
/// `detail` (a bare string). Parsing is tolerant: entries that are neither
/// a string nor a list of strings are dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorBody {
    fields: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Messages {
    One(String),
    Many(Vec<String>),
    Other(serde_json::Value),
}

impl ErrorBody {
    /// Parse a response body, or `None` when it is not a JSON object.
    pub fn parse(text: &str) -> Option<Self> {
        let raw: BTreeMap<String, Messages> = serde_json::from_str(text).ok()?;
        let fields = raw
            .into_iter()
            .filter_map(|(field, messages)| match messages {
                Messages::One(message) => Some((field, vec![message])),
                Messages::Many(messages) => Some((field, messages)),
                Messages::Other(_) => None,
            })
            .collect();
        Some(Self { fields })
    }

    /// First message recorded for a field, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// First non-field message (`non_field_errors`, then `detail`).
    pub fn non_field(&self) -> Option<&str> {
        self.first("non_field_errors").or_else(|| self.first("detail"))
    }

    /// Resolve the user-facing message: non-field error, then the given
    /// fields in order, then the fallback.
    pub fn user_message(&self, fields: &[&str], fallback: &str) -> String {
        if let Some(message) = self.non_field() {
            return message.to_string();
        }
        for field in fields {
            if let Some(message) = self.first(field) {
                return message.to_string();
            }
        }
        fallback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_message_lists() {
        let body = ErrorBody::parse(r#"{"email": ["Enter a valid email address."]}"#).unwrap();
        assert_eq!(body.first("email"), Some("Enter a valid email address."));
        assert_eq!(body.non_field(), None);
    }

    #[test]
    fn parses_bare_detail_string() {
        let body = ErrorBody::parse(r#"{"detail": "Not found."}"#).unwrap();
        assert_eq!(body.non_field(), Some("Not found."));
    }

    #[test]
    fn rejects_non_object_bodies() {
        assert_eq!(ErrorBody::parse("<html>Server Error</html>"), None);
        assert_eq!(ErrorBody::parse(r#""just a string""#), None);
    }

    #[test]
    fn non_field_error_wins_over_field_errors() {
        let body = ErrorBody::parse(
            r#"{"non_field_errors": ["Invalid credentials"], "email": ["Bad email"]}"#,
        )
        .unwrap();
        assert_eq!(
            body.user_message(&["email"], "Login failed. Please try again."),
            "Invalid credentials"
        );
    }

    #[test]
    fn field_errors_resolve_in_given_order() {
        let body = ErrorBody::parse(
            r#"{"email": ["Bad email"], "password1": ["Too short"]}"#,
        )
        .unwrap();
        assert_eq!(body.user_message(&["password1", "email"], "fallback"), "Too short");
        assert_eq!(body.user_message(&["email", "password1"], "fallback"), "Bad email");
    }

    #[test]
    fn falls_back_to_generic_message() {
        let body = ErrorBody::parse(r#"{"other": ["whatever"]}"#).unwrap();
        assert_eq!(
            body.user_message(&["email"], "Login failed. Please try again."),
            "Login failed. Please try again."
        );
    }

    #[test]
    fn validation_errors_collect_blank_fields() {
        let mut errors = ValidationErrors::new();
        errors.require("email", "  ");
        errors.require("password", "hunter2");
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email"]);
        assert!(errors.into_result().is_err());
    }
}
