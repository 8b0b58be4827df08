//! Comment drafts and the comment service.

use serde::Serialize;
use uuid::Uuid;

use crate::auth::models::{User, UserId};
use crate::content::models::Comment;
use crate::net::errors::{ApiError, ValidationErrors};
use crate::net::http::{self, HttpClient};

/// Shortest comment the form accepts.
pub const COMMENT_MIN_LEN: usize = 2;

/// Longest comment the form accepts.
pub const COMMENT_MAX_LEN: usize = 2000;

/// A comment as edited in a comment box. Transient, never persisted.
#[derive(Clone, Debug, Default)]
pub struct CommentDraft {
    pub comment: String,
    /// Users referenced in the comment. Kept as full records while
    /// editing; resolved to ids only at submission time.
    pub mentioned_users: Vec<User>,
    /// Whether replies may nest under the created comment.
    pub nested: bool,
    /// Parent comment id, attached only for replies inside a child group.
    pub parent: Option<i64>,
}

impl CommentDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("comment", &self.comment);
        let length = self.comment.chars().count();
        if length > 0 && length < COMMENT_MIN_LEN {
            errors.push(
                "comment",
                &format!("must be at least {COMMENT_MIN_LEN} characters"),
            );
        }
        if length > COMMENT_MAX_LEN {
            errors.push(
                "comment",
                &format!("must be at most {COMMENT_MAX_LEN} characters"),
            );
        }
        errors.into_result()
    }
}

/// Create/update payload. `id` is null on create, matching the form's
/// submission shape; mentions are sent on create only.
#[derive(Debug, Serialize)]
struct CommentPayload<'a> {
    id: Option<i64>,
    comment: &'a str,
    user: UserId,
    mentioned_users: Vec<UserId>,
    is_nesting_permitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<i64>,
}

/// Service for comment creation and editing, scoped to a post.
#[derive(Clone)]
pub struct CommentService {
    http: HttpClient,
}

impl CommentService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Create a comment on a post, authored by the given user.
    ///
    /// The created record is returned to the caller; navigation is the
    /// caller's concern.
    pub async fn create(
        &self,
        post_uuid: &Uuid,
        draft: &CommentDraft,
        author: UserId,
    ) -> Result<Comment, ApiError> {
        draft.validate().map_err(ApiError::Validation)?;
        let payload = CommentPayload {
            id: None,
            comment: &draft.comment,
            user: author,
            mentioned_users: draft.mentioned_users.iter().map(|user| user.id).collect(),
            is_nesting_permitted: draft.nested,
            parent: draft.parent,
        };
        http::send_json(
            self.http
                .post(&format!("/api/v1/posts/{post_uuid}/comments/"))
                .json(&payload),
        )
        .await
    }

    /// Update an existing comment. Same payload as create, plus the
    /// record id and without re-submitting mentions.
    pub async fn update(
        &self,
        post_uuid: &Uuid,
        id: i64,
        draft: &CommentDraft,
        author: UserId,
    ) -> Result<Comment, ApiError> {
        draft.validate().map_err(ApiError::Validation)?;
        let payload = CommentPayload {
            id: Some(id),
            comment: &draft.comment,
            user: author,
            mentioned_users: Vec::new(),
            is_nesting_permitted: draft.nested,
            parent: draft.parent,
        };
        http::send_json(
            self.http
                .put(&format!("/api/v1/posts/{post_uuid}/comments/{id}/"))
                .json(&payload),
        )
        .await
    }
}
