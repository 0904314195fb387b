//! Maps domain failures onto HTTP responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The body was not valid JSON or had the wrong shape.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("malformed query string: {0}")]
    MalformedQuery(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(DomainError::Validation(_))
            | Self::MalformedBody(_)
            | Self::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            Self::Domain(DomainError::NotFound(..)) => StatusCode::NOT_FOUND,
            Self::Domain(DomainError::Duplicate(_)) => StatusCode::CONFLICT,
            Self::Domain(DomainError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::Validation(_))
            | Self::MalformedBody(_)
            | Self::MalformedQuery(_) => "validation_error",
            Self::Domain(DomainError::NotFound(..)) => "not_found",
            Self::Domain(DomainError::Duplicate(_)) => "duplicate",
            Self::Domain(DomainError::Storage(_)) => "storage_error",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Domain(DomainError::Storage(detail)) => {
                tracing::error!("Storage failure: {detail}");
                "internal storage error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: self.kind(),
            message,
        };
        (self.status(), Json(body)).into_response()
    }
}
