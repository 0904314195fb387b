//! Application services for the course forums.

pub mod forum;
pub mod validation;

pub use forum::ForumService;
