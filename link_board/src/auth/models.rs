//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// The authenticated user's identity record.
///
/// The backend's who-am-I endpoint spells the id `pk`; cached copies and
/// profile endpoints spell it `id`. Both are accepted.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct User {
    #[serde(alias = "pk")]
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

impl User {
    /// Human-readable name: "First Last" when available, else the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Sign-in request payload
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up request payload
#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Authentication response carrying the bearer credential.
///
/// The credential is optional on the wire; an absent `key` decodes as
/// empty and is simply not persisted.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_decodes_pk_and_id_spellings() {
        let from_pk: User =
            serde_json::from_str(r#"{"pk": 1, "username": "ada", "email": "a@b.com"}"#).unwrap();
        let from_id: User =
            serde_json::from_str(r#"{"id": 1, "username": "ada", "email": "a@b.com"}"#).unwrap();
        assert_eq!(from_pk, from_id);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user: User =
            serde_json::from_str(r#"{"id": 1, "username": "ada", "email": "a@b.com"}"#).unwrap();
        assert_eq!(user.display_name(), "ada");
        user.first_name = "Ada".to_string();
        user.last_name = "Lovelace".to_string();
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn missing_key_decodes_as_empty() {
        let auth: AuthResponse = serde_json::from_str("{}").unwrap();
        assert!(auth.key.is_empty());
    }
}
