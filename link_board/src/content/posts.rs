//! Post drafts and the post service.

use serde::Serialize;
use uuid::Uuid;

use crate::auth::models::UserId;
use crate::content::models::{Page, Post};
use crate::net::errors::{ApiError, ValidationErrors};
use crate::net::http::{self, HttpClient};

/// A post as edited in a compose form. Transient, never persisted.
#[derive(Clone, Debug, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title);
        errors.require("content", &self.content);
        errors.into_result()
    }
}

/// Create/update payload. The author is always the submitting user; the
/// record id rides along only on updates.
#[derive(Debug, Serialize)]
struct PostPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    title: &'a str,
    content: &'a str,
    author: UserId,
    group: Option<i64>,
}

/// Service for post listing, fetching, and mutation.
#[derive(Clone)]
pub struct PostService {
    http: HttpClient,
}

impl PostService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// List posts, optionally filtered by a search query.
    pub async fn list(&self, search: Option<&str>) -> Result<Page<Post>, ApiError> {
        let mut request = self.http.get("/api/v1/posts/");
        if let Some(query) = search {
            request = request.query(&[("search", query)]);
        }
        http::send_json(request).await
    }

    /// Fetch a single post by its public identifier.
    pub async fn get(&self, uuid: &Uuid) -> Result<Post, ApiError> {
        http::send_json(self.http.get(&format!("/api/v1/posts/{uuid}/"))).await
    }

    /// Create a post authored by the given user, optionally in a group.
    ///
    /// Callers creating a top-level post navigate to the returned
    /// record's detail route.
    pub async fn create(
        &self,
        draft: &PostDraft,
        author: UserId,
        group: Option<i64>,
    ) -> Result<Post, ApiError> {
        draft.validate().map_err(ApiError::Validation)?;
        let payload = PostPayload {
            id: None,
            title: &draft.title,
            content: &draft.content,
            author,
            group,
        };
        http::send_json(self.http.post("/api/v1/posts/").json(&payload)).await
    }

    /// Update an existing post. Same payload as create, plus the record id.
    pub async fn update(
        &self,
        uuid: &Uuid,
        id: i64,
        draft: &PostDraft,
        author: UserId,
        group: Option<i64>,
    ) -> Result<Post, ApiError> {
        draft.validate().map_err(ApiError::Validation)?;
        let payload = PostPayload {
            id: Some(id),
            title: &draft.title,
            content: &draft.content,
            author,
            group,
        };
        http::send_json(
            self.http
                .put(&format!("/api/v1/posts/{uuid}/"))
                .json(&payload),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_title_and_content() {
        let draft = PostDraft::default();
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["title", "content"]);
    }

    #[test]
    fn create_payload_omits_id_and_keeps_null_group() {
        let payload = PostPayload {
            id: None,
            title: "Test Post",
            content: "Test content",
            author: 1,
            group: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("group").unwrap().is_null());
    }

    #[test]
    fn update_payload_carries_record_id() {
        let payload = PostPayload {
            id: Some(42),
            title: "Test Post",
            content: "Test content",
            author: 1,
            group: Some(3),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value.get("id").unwrap(), 42);
        assert_eq!(value.get("group").unwrap(), 3);
    }
}
