//! # Ports
//!
//! Any storage or lookup adapter must implement these traits to be wired
//! into the service.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{CourseSummary, Forum, Reply, Thread};

/// Persistence contract for Forum aggregates.
///
/// Appends and removals must be atomic per aggregate: two concurrent
/// `append_thread` calls on the same forum both land.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ForumRepository: Send + Sync {
    // Forum Operations
    /// Fails with `Duplicate` if a forum for the course already exists.
    async fn insert_forum(&self, forum: Forum) -> Result<Forum>;
    async fn get_forum(&self, course_id: &str) -> Result<Option<Forum>>;
    /// All forums in insertion order.
    async fn list_forums(&self) -> Result<Vec<Forum>>;
    async fn search_forums(&self, query: &str) -> Result<Vec<Forum>>;

    // Thread Operations
    async fn append_thread(&self, course_id: &str, thread: Thread) -> Result<Thread>;
    async fn get_thread(&self, course_id: &str, thread_id: Uuid) -> Result<Thread>;
    /// Removes the thread together with its replies.
    async fn remove_thread(&self, course_id: &str, thread_id: Uuid) -> Result<()>;
    async fn search_threads(&self, course_id: &str, query: &str) -> Result<Vec<Thread>>;

    // Reply Operations
    /// Returns the reply as stored; its timestamp may be lifted to the
    /// thread's creation time.
    async fn append_reply(&self, course_id: &str, thread_id: Uuid, reply: Reply) -> Result<Reply>;
    async fn remove_reply(&self, course_id: &str, thread_id: Uuid, reply_id: Uuid) -> Result<()>;
}

/// Lookup contract for the externally owned Course entity.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Case-insensitive substring match on course name; blank query lists all.
    async fn search_courses(&self, query: &str) -> Result<Vec<CourseSummary>>;
}
