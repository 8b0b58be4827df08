//! Current-user and user-scoped collection fetches.

use async_trait::async_trait;

use crate::auth::models::User;
use crate::content::models::{Group, GroupInvite, Page, Post};
use crate::net::errors::ApiError;
use crate::net::http::{self, HttpClient};
use crate::session::UserSource;

/// Service for user identity and user-scoped collections.
#[derive(Clone)]
pub struct UserService {
    http: HttpClient,
}

impl UserService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch the currently authenticated user.
    pub async fn auth_user(&self) -> Result<User, ApiError> {
        http::send_json(self.http.get("/rest-auth/user/")).await
    }

    /// Invalidate the server session. Callers are expected to clear local
    /// state regardless of this call's outcome.
    pub async fn logout(&self) -> Result<(), ApiError> {
        http::send_unit(self.http.post("/rest-auth/logout/").json(&serde_json::json!({}))).await
    }

    /// Fetch a public profile by username.
    pub async fn by_username(&self, username: &str) -> Result<User, ApiError> {
        http::send_json(self.http.get(&format!("/api/v1/users/{username}/"))).await
    }

    pub async fn invitations(&self, username: &str) -> Result<Page<GroupInvite>, ApiError> {
        self.scoped(username, "invitations").await
    }

    pub async fn requested_groups(&self, username: &str) -> Result<Page<Group>, ApiError> {
        self.scoped(username, "requested_groups").await
    }

    pub async fn user_invites(&self, username: &str) -> Result<Page<GroupInvite>, ApiError> {
        self.scoped(username, "user_invites").await
    }

    pub async fn user_upvotes(&self, username: &str) -> Result<Page<Post>, ApiError> {
        self.scoped(username, "user_upvotes").await
    }

    pub async fn user_downvotes(&self, username: &str) -> Result<Page<Post>, ApiError> {
        self.scoped(username, "user_downvotes").await
    }

    pub async fn bookmarks(&self, username: &str) -> Result<Page<Post>, ApiError> {
        self.scoped(username, "bookmarks").await
    }

    async fn scoped<T: serde::de::DeserializeOwned>(
        &self,
        username: &str,
        collection: &str,
    ) -> Result<Page<T>, ApiError> {
        http::send_json(
            self.http
                .get(&format!("/api/v1/users/{username}/{collection}/")),
        )
        .await
    }
}

#[async_trait]
impl UserSource for UserService {
    async fn fetch_current(&self) -> Result<User, ApiError> {
        self.auth_user().await
    }
}
