//! # Domain Models
//!
//! A Forum is the aggregate root: it owns its Threads, and each Thread owns
//! its Replies. Thread and Reply ids are UUID v7 so they sort by creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The discussion space of a single course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    /// Identifier of the externally owned Course; unique across forums.
    pub course_id: String,
    /// Display cache of the course name at forum creation time.
    pub course_name: String,
    /// Threads in creation order.
    pub threads: Vec<Thread>,
    pub created_at: DateTime<Utc>,
}

impl Forum {
    pub fn new(course_id: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            course_name: course_name.into(),
            threads: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn thread(&self, thread_id: Uuid) -> Option<&Thread> {
        self.threads.iter().find(|t| t.thread_id == thread_id)
    }

    pub fn thread_mut(&mut self, thread_id: Uuid) -> Option<&mut Thread> {
        self.threads.iter_mut().find(|t| t.thread_id == thread_id)
    }

    /// Case-insensitive substring match on the course name.
    pub fn matches_name(&self, query: &str) -> bool {
        contains_ignore_case(&self.course_name, query)
    }
}

/// A titled discussion topic within a Forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub thread_id: Uuid,
    pub title: String,
    pub description: String,
    /// Reference to the externally owned User who opened the thread.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Replies in post order.
    pub replies: Vec<Reply>,
}

impl Thread {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            thread_id: Uuid::now_v7(),
            title: title.into(),
            description: description.into(),
            created_by: created_by.into(),
            created_at: Utc::now(),
            replies: Vec::new(),
        }
    }

    /// Case-insensitive substring match on title or description.
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.title, query) || contains_ignore_case(&self.description, query)
    }

    /// Appends a reply, lifting its timestamp to the thread's creation time
    /// if the clock went backwards.
    pub fn push_reply(&mut self, mut reply: Reply) -> Reply {
        if reply.timestamp < self.created_at {
            reply.timestamp = self.created_at;
        }
        self.replies.push(reply.clone());
        reply
    }
}

/// A single message posted within a Thread. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub reply_id: Uuid,
    pub user_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Reply {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            reply_id: Uuid::now_v7(),
            user_id: user_id.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Id and display name of a course, as reported by the course catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_id: String,
    pub course_name: String,
}

/// Substring test used by every search. A blank needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
