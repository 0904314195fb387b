//! Request schemas for the forum endpoints.
//!
//! Body fields are optional at the serde level so a missing field surfaces
//! as a `ValidationError` naming it rather than a generic decode failure.

use domains::{DomainError, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateForumRequest {
    pub course_id: Option<String>,
    pub course_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyRequest {
    pub user_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

/// Unwraps a body field, failing with a validation error naming it.
pub fn require(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| DomainError::Validation(format!("{field} is required")))
}
