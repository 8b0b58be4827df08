//! Content data models.
//!
//! Wire shapes for the REST backend's records. Fields beyond the ones the
//! client itself writes default on decode, so serializer drift on the
//! server degrades to missing data instead of a decode failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::models::UserId;

/// One page of a paginated listing.
#[derive(Clone, Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A submitted post.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub uuid: Uuid,
    pub title: String,
    pub content: String,
    pub author: UserId,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub upvote_count: i64,
    #[serde(default)]
    pub downvote_count: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A comment on a post.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub comment: String,
    pub user: UserId,
    #[serde(default)]
    pub mentioned_users: Vec<UserId>,
    #[serde(default)]
    pub is_nesting_permitted: bool,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A group posts can belong to.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Group {
    pub id: i64,
    #[serde(default)]
    pub uuid: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_by: Option<UserId>,
}

/// A pending invitation tying a user to a group.
///
/// The serializer for invites nests its group differently across
/// endpoints, so the group is kept as raw JSON.
#[derive(Clone, Debug, Deserialize)]
pub struct GroupInvite {
    pub id: i64,
    #[serde(default)]
    pub group: serde_json::Value,
    #[serde(default)]
    pub user: Option<UserId>,
    #[serde(default)]
    pub status: Option<String>,
}
