//! Group drafts and the group service.

use serde::Serialize;

use crate::auth::models::UserId;
use crate::content::models::Group;
use crate::net::errors::{ApiError, ValidationErrors};
use crate::net::http::{self, HttpClient};

/// A group as edited in the create-group dialog.
#[derive(Clone, Debug, Default)]
pub struct GroupDraft {
    pub name: String,
    pub description: String,
}

impl GroupDraft {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require("description", &self.description);
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
struct GroupPayload<'a> {
    name: &'a str,
    description: &'a str,
    created_by: UserId,
}

/// Service for group creation.
#[derive(Clone)]
pub struct GroupService {
    http: HttpClient,
}

impl GroupService {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn create(&self, draft: &GroupDraft, created_by: UserId) -> Result<Group, ApiError> {
        draft.validate().map_err(ApiError::Validation)?;
        let payload = GroupPayload {
            name: &draft.name,
            description: &draft.description,
            created_by,
        };
        http::send_json(self.http.post("/api/v1/groups/").json(&payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_name_and_description() {
        let errors = GroupDraft::default().validate().unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["name", "description"]
        );
    }
}
