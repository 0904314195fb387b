//! # PostgreSQL Forum store
//!
//! Maps the relational `forums` / `threads` / `replies` tables to the Forum
//! aggregate. Every append is a single `INSERT ... SELECT` guarded by the
//! parent row, so it either lands atomically or reports the missing parent.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{DomainError, Forum, ForumRepository, Reply, Result, Thread};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::storage_error;

#[derive(Debug, Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

const THREAD_COLUMNS: &str = "thread_id, course_id, title, description, created_by, created_at";

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn forum_exists(&self, course_id: &str) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM forums WHERE course_id = $1)")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn thread_exists(&self, course_id: &str, thread_id: Uuid) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM threads WHERE thread_id = $1 AND course_id = $2)",
        )
        .bind(thread_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)
    }

    /// Explains why a guarded statement touched no rows.
    async fn missing_parent(&self, course_id: &str, thread_id: Uuid) -> Result<DomainError> {
        if !self.forum_exists(course_id).await? {
            return Ok(DomainError::forum_not_found(course_id));
        }
        Ok(DomainError::thread_not_found(thread_id))
    }

    /// Builds full aggregates for already-fetched forum rows, keeping row order.
    async fn assemble(&self, rows: Vec<PgRow>) -> Result<Vec<Forum>> {
        let mut forums = rows
            .iter()
            .map(forum_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(storage_error)?;
        if forums.is_empty() {
            return Ok(forums);
        }

        let course_ids: Vec<String> = forums.iter().map(|f| f.course_id.clone()).collect();
        let thread_rows = sqlx::query(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE course_id = ANY($1) ORDER BY seq"
        ))
        .bind(&course_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut by_course: HashMap<String, Vec<Thread>> = HashMap::new();
        let mut threads = Vec::with_capacity(thread_rows.len());
        let mut owners = Vec::with_capacity(thread_rows.len());
        for row in &thread_rows {
            owners.push(row.try_get::<String, _>("course_id").map_err(storage_error)?);
            threads.push(thread_from_row(row).map_err(storage_error)?);
        }
        self.attach_replies(&mut threads).await?;
        for (owner, thread) in owners.into_iter().zip(threads) {
            by_course.entry(owner).or_default().push(thread);
        }

        for forum in &mut forums {
            forum.threads = by_course.remove(&forum.course_id).unwrap_or_default();
        }
        Ok(forums)
    }

    async fn attach_replies(&self, threads: &mut [Thread]) -> Result<()> {
        if threads.is_empty() {
            return Ok(());
        }
        let thread_ids: Vec<Uuid> = threads.iter().map(|t| t.thread_id).collect();
        let rows = sqlx::query(
            "SELECT reply_id, thread_id, user_id, message, created_at
             FROM replies WHERE thread_id = ANY($1) ORDER BY seq",
        )
        .bind(&thread_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut by_thread: HashMap<Uuid, Vec<Reply>> = HashMap::new();
        for row in &rows {
            let thread_id: Uuid = row.try_get("thread_id").map_err(storage_error)?;
            by_thread
                .entry(thread_id)
                .or_default()
                .push(reply_from_row(row).map_err(storage_error)?);
        }
        for thread in threads {
            thread.replies = by_thread.remove(&thread.thread_id).unwrap_or_default();
        }
        Ok(())
    }
}

fn forum_from_row(row: &PgRow) -> std::result::Result<Forum, sqlx::Error> {
    Ok(Forum {
        course_id: row.try_get("course_id")?,
        course_name: row.try_get("course_name")?,
        threads: Vec::new(),
        created_at: row.try_get("created_at")?,
    })
}

fn thread_from_row(row: &PgRow) -> std::result::Result<Thread, sqlx::Error> {
    Ok(Thread {
        thread_id: row.try_get("thread_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        replies: Vec::new(),
    })
}

fn reply_from_row(row: &PgRow) -> std::result::Result<Reply, sqlx::Error> {
    Ok(Reply {
        reply_id: row.try_get("reply_id")?,
        user_id: row.try_get("user_id")?,
        message: row.try_get("message")?,
        timestamp: row.try_get("created_at")?,
    })
}

/// Escapes LIKE wildcards and wraps the query for a substring match.
pub(super) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl ForumRepository for PgForumRepository {
    async fn insert_forum(&self, forum: Forum) -> Result<Forum> {
        let inserted = sqlx::query(
            "INSERT INTO forums (course_id, course_name, created_at) VALUES ($1, $2, $3)
             ON CONFLICT (course_id) DO NOTHING",
        )
        .bind(&forum.course_id)
        .bind(&forum.course_name)
        .bind(forum.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if inserted.rows_affected() == 0 {
            return Err(DomainError::duplicate_forum(&forum.course_id));
        }
        Ok(forum)
    }

    async fn get_forum(&self, course_id: &str) -> Result<Option<Forum>> {
        let row = sqlx::query(
            "SELECT course_id, course_name, created_at FROM forums WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_forums(&self) -> Result<Vec<Forum>> {
        let rows = sqlx::query("SELECT course_id, course_name, created_at FROM forums ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        self.assemble(rows).await
    }

    async fn search_forums(&self, query: &str) -> Result<Vec<Forum>> {
        let rows = sqlx::query(
            "SELECT course_id, course_name, created_at FROM forums
             WHERE course_name ILIKE $1 ORDER BY seq",
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;
        self.assemble(rows).await
    }

    async fn append_thread(&self, course_id: &str, thread: Thread) -> Result<Thread> {
        let inserted = sqlx::query(
            "INSERT INTO threads (thread_id, course_id, title, description, created_by, created_at)
             SELECT $1, f.course_id, $3, $4, $5, $6 FROM forums f WHERE f.course_id = $2",
        )
        .bind(thread.thread_id)
        .bind(course_id)
        .bind(&thread.title)
        .bind(&thread.description)
        .bind(&thread.created_by)
        .bind(thread.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if inserted.rows_affected() == 0 {
            return Err(DomainError::forum_not_found(course_id));
        }
        Ok(thread)
    }

    async fn get_thread(&self, course_id: &str, thread_id: Uuid) -> Result<Thread> {
        let row = sqlx::query(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE thread_id = $1 AND course_id = $2"
        ))
        .bind(thread_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(row) = row else {
            return Err(self.missing_parent(course_id, thread_id).await?);
        };
        let mut threads = [thread_from_row(&row).map_err(storage_error)?];
        self.attach_replies(&mut threads).await?;
        let [thread] = threads;
        Ok(thread)
    }

    async fn remove_thread(&self, course_id: &str, thread_id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM threads WHERE thread_id = $1 AND course_id = $2")
            .bind(thread_id)
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if deleted.rows_affected() == 0 {
            return Err(self.missing_parent(course_id, thread_id).await?);
        }
        Ok(())
    }

    async fn search_threads(&self, course_id: &str, query: &str) -> Result<Vec<Thread>> {
        if !self.forum_exists(course_id).await? {
            return Err(DomainError::forum_not_found(course_id));
        }
        let rows = sqlx::query(&format!(
            "SELECT {THREAD_COLUMNS} FROM threads
             WHERE course_id = $1 AND (title ILIKE $2 OR description ILIKE $2)
             ORDER BY seq"
        ))
        .bind(course_id)
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut threads = rows
            .iter()
            .map(thread_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(storage_error)?;
        self.attach_replies(&mut threads).await?;
        Ok(threads)
    }

    async fn append_reply(&self, course_id: &str, thread_id: Uuid, reply: Reply) -> Result<Reply> {
        let stored_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "INSERT INTO replies (reply_id, thread_id, user_id, message, created_at)
             SELECT $1, t.thread_id, $4, $5, GREATEST($6::timestamptz, t.created_at)
             FROM threads t WHERE t.thread_id = $2 AND t.course_id = $3
             RETURNING created_at",
        )
        .bind(reply.reply_id)
        .bind(thread_id)
        .bind(course_id)
        .bind(&reply.user_id)
        .bind(&reply.message)
        .bind(reply.timestamp)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match stored_at {
            Some(timestamp) => Ok(Reply { timestamp, ..reply }),
            None => Err(self.missing_parent(course_id, thread_id).await?),
        }
    }

    async fn remove_reply(&self, course_id: &str, thread_id: Uuid, reply_id: Uuid) -> Result<()> {
        let deleted = sqlx::query(
            "DELETE FROM replies r USING threads t
             WHERE r.reply_id = $1 AND r.thread_id = t.thread_id
               AND t.thread_id = $2 AND t.course_id = $3",
        )
        .bind(reply_id)
        .bind(thread_id)
        .bind(course_id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if deleted.rows_affected() > 0 {
            return Ok(());
        }
        if !self.thread_exists(course_id, thread_id).await? {
            return Err(self.missing_parent(course_id, thread_id).await?);
        }
        Err(DomainError::reply_not_found(reply_id))
    }
}
