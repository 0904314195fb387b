//! Field checks applied before anything reaches a repository.

use domains::{DomainError, Result};

pub const MAX_COURSE_NAME_LEN: usize = 200;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
pub const MAX_MESSAGE_LEN: usize = 10_000;

/// Fixed path segments directly under `/forums`. A forum keyed by one of
/// these could be created but never addressed by its own routes.
pub const RESERVED_COURSE_IDS: &[&str] = &["course", "search", "search-courses"];

/// Trims `value` and rejects it if nothing is left.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Rejects values longer than `max` characters.
pub fn bounded<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str> {
    if value.chars().count() > max {
        return Err(DomainError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value)
}

/// A trimmed, non-blank course id that does not shadow a fixed route.
pub fn course_id(value: &str) -> Result<&str> {
    let id = required("courseId", value)?;
    if RESERVED_COURSE_IDS.contains(&id) {
        return Err(DomainError::Validation(format!(
            "courseId '{id}' is reserved"
        )));
    }
    Ok(id)
}
