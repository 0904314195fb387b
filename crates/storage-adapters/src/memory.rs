//! # In-memory Forum store
//!
//! Each forum lives in one `DashMap` entry. Mutations go through `get_mut`,
//! which holds the shard write lock for the whole read-modify-write, so
//! concurrent appends to the same forum are serialized rather than lost.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{DomainError, Forum, ForumRepository, Reply, Result, Thread};
use uuid::Uuid;

struct StoredForum {
    /// Insertion sequence; gives listings a stable order.
    seq: u64,
    forum: Forum,
}

#[derive(Default)]
pub struct InMemoryForumRepository {
    forums: DashMap<String, StoredForum>,
    next_seq: AtomicU64,
}

impl InMemoryForumRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_where(&self, keep: impl Fn(&Forum) -> bool) -> Vec<Forum> {
        let mut hits: Vec<(u64, Forum)> = self
            .forums
            .iter()
            .filter(|entry| keep(&entry.forum))
            .map(|entry| (entry.seq, entry.forum.clone()))
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);
        hits.into_iter().map(|(_, forum)| forum).collect()
    }
}

#[async_trait]
impl ForumRepository for InMemoryForumRepository {
    async fn insert_forum(&self, forum: Forum) -> Result<Forum> {
        match self.forums.entry(forum.course_id.clone()) {
            Entry::Occupied(_) => Err(DomainError::duplicate_forum(&forum.course_id)),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(StoredForum {
                    seq,
                    forum: forum.clone(),
                });
                Ok(forum)
            }
        }
    }

    async fn get_forum(&self, course_id: &str) -> Result<Option<Forum>> {
        Ok(self.forums.get(course_id).map(|entry| entry.forum.clone()))
    }

    async fn list_forums(&self) -> Result<Vec<Forum>> {
        Ok(self.collect_where(|_| true))
    }

    async fn search_forums(&self, query: &str) -> Result<Vec<Forum>> {
        Ok(self.collect_where(|forum| forum.matches_name(query)))
    }

    async fn append_thread(&self, course_id: &str, thread: Thread) -> Result<Thread> {
        let mut entry = self
            .forums
            .get_mut(course_id)
            .ok_or_else(|| DomainError::forum_not_found(course_id))?;
        entry.forum.threads.push(thread.clone());
        Ok(thread)
    }

    async fn get_thread(&self, course_id: &str, thread_id: Uuid) -> Result<Thread> {
        let entry = self
            .forums
            .get(course_id)
            .ok_or_else(|| DomainError::forum_not_found(course_id))?;
        entry
            .forum
            .thread(thread_id)
            .cloned()
            .ok_or_else(|| DomainError::thread_not_found(thread_id))
    }

    async fn remove_thread(&self, course_id: &str, thread_id: Uuid) -> Result<()> {
        let mut entry = self
            .forums
            .get_mut(course_id)
            .ok_or_else(|| DomainError::forum_not_found(course_id))?;
        let threads = &mut entry.forum.threads;
        let idx = threads
            .iter()
            .position(|t| t.thread_id == thread_id)
            .ok_or_else(|| DomainError::thread_not_found(thread_id))?;
        // Replies are owned by the thread and go with it.
        threads.remove(idx);
        Ok(())
    }

    async fn search_threads(&self, course_id: &str, query: &str) -> Result<Vec<Thread>> {
        let entry = self
            .forums
            .get(course_id)
            .ok_or_else(|| DomainError::forum_not_found(course_id))?;
        Ok(entry
            .forum
            .threads
            .iter()
            .filter(|t| t.matches(query))
            .cloned()
            .collect())
    }

    async fn append_reply(&self, course_id: &str, thread_id: Uuid, reply: Reply) -> Result<Reply> {
        let mut entry = self
            .forums
            .get_mut(course_id)
            .ok_or_else(|| DomainError::forum_not_found(course_id))?;
        let thread = entry
            .forum
            .thread_mut(thread_id)
            .ok_or_else(|| DomainError::thread_not_found(thread_id))?;
        Ok(thread.push_reply(reply))
    }

    async fn remove_reply(&self, course_id: &str, thread_id: Uuid, reply_id: Uuid) -> Result<()> {
        let mut entry = self
            .forums
            .get_mut(course_id)
            .ok_or_else(|| DomainError::forum_not_found(course_id))?;
        let thread = entry
            .forum
            .thread_mut(thread_id)
            .ok_or_else(|| DomainError::thread_not_found(thread_id))?;
        let idx = thread
            .replies
            .iter()
            .position(|r| r.reply_id == reply_id)
            .ok_or_else(|| DomainError::reply_not_found(reply_id))?;
        thread.replies.remove(idx);
        Ok(())
    }
}
