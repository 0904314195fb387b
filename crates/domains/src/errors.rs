//! # DomainError
//!
//! Centralized error handling for the forum core.
//! Adapters translate their own failures into these variants.

use thiserror::Error;
use uuid::Uuid;

/// The primary error type for all forum operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or malformed required field (e.g., blank thread title)
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced resource absent (e.g., Forum, Thread, Reply)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Resource already exists (e.g., second forum for a course)
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Persistence failure (e.g., database unreachable)
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn forum_not_found(course_id: &str) -> Self {
        Self::NotFound("Forum".to_string(), course_id.to_string())
    }

    pub fn thread_not_found(thread_id: Uuid) -> Self {
        Self::NotFound("Thread".to_string(), thread_id.to_string())
    }

    pub fn reply_not_found(reply_id: Uuid) -> Self {
        Self::NotFound("Reply".to_string(), reply_id.to_string())
    }

    pub fn duplicate_forum(course_id: &str) -> Self {
        Self::Duplicate(format!("a forum already exists for course {course_id}"))
    }
}

/// A specialized Result type for forum logic.
pub type Result<T> = std::result::Result<T, DomainError>;
