//! # ForumService
//!
//! Validates input, stamps new threads and replies, and delegates to the
//! `ForumRepository` and `CourseCatalog` ports.

use std::sync::Arc;

use domains::{
    CourseCatalog, CourseSummary, DomainError, Forum, ForumRepository, Reply, Result, Thread,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::validation::{
    bounded, course_id as valid_course_id, required, MAX_COURSE_NAME_LEN, MAX_DESCRIPTION_LEN, MAX_MESSAGE_LEN, MAX_TITLE_LEN,
};

#[derive(Clone)]
pub struct ForumService {
    repo: Arc<dyn ForumRepository>,
    courses: Arc<dyn CourseCatalog>,
}

impl ForumService {
    pub fn new(repo: Arc<dyn ForumRepository>, courses: Arc<dyn CourseCatalog>) -> Self {
        Self { repo, courses }
    }

    pub async fn create_forum(&self, course_id: &str, course_name: &str) -> Result<Forum> {
        let course_id = valid_course_id(course_id)?;
        let course_name = bounded(
            "courseName",
            required("courseName", course_name)?,
            MAX_COURSE_NAME_LEN,
        )?;

        let forum = self.repo.insert_forum(Forum::new(course_id, course_name)).await?;
        info!(course_id = %forum.course_id, "forum created");
        Ok(forum)
    }

    pub async fn get_forum_by_course(&self, course_id: &str) -> Result<Forum> {
        let course_id = course_id.trim();
        self.repo
            .get_forum(course_id)
            .await?
            .ok_or_else(|| DomainError::forum_not_found(course_id))
    }

    pub async fn list_forums(&self) -> Result<Vec<Forum>> {
        self.repo.list_forums().await
    }

    pub async fn add_thread(
        &self,
        course_id: &str,
        title: &str,
        description: &str,
        created_by: &str,
    ) -> Result<Thread> {
        let course_id = course_id.trim();
        let title = bounded("title", required("title", title)?, MAX_TITLE_LEN)?;
        let description = bounded("description", description.trim(), MAX_DESCRIPTION_LEN)?;
        let created_by = required("createdBy", created_by)?;

        let thread = self
            .repo
            .append_thread(course_id, Thread::new(title, description, created_by))
            .await?;
        info!(course_id, thread_id = %thread.thread_id, created_by, "thread added");
        Ok(thread)
    }

    pub async fn get_thread(&self, course_id: &str, thread_id: Uuid) -> Result<Thread> {
        let course_id = course_id.trim();
        self.repo.get_thread(course_id, thread_id).await
    }

    pub async fn delete_thread(&self, course_id: &str, thread_id: Uuid) -> Result<()> {
        let course_id = course_id.trim();
        self.repo.remove_thread(course_id, thread_id).await?;
        info!(course_id, %thread_id, "thread deleted");
        Ok(())
    }

    pub async fn add_reply(
        &self,
        course_id: &str,
        thread_id: Uuid,
        user_id: &str,
        message: &str,
    ) -> Result<Reply> {
        let course_id = course_id.trim();
        let user_id = required("userId", user_id)?;
        let message = bounded("message", required("message", message)?, MAX_MESSAGE_LEN)?;

        let reply = self
            .repo
            .append_reply(course_id, thread_id, Reply::new(user_id, message))
            .await?;
        info!(course_id, %thread_id, reply_id = %reply.reply_id, "reply added");
        Ok(reply)
    }

    pub async fn delete_reply(&self, course_id: &str, thread_id: Uuid, reply_id: Uuid) -> Result<()> {
        let course_id = course_id.trim();
        self.repo.remove_reply(course_id, thread_id, reply_id).await?;
        info!(course_id, %thread_id, %reply_id, "reply deleted");
        Ok(())
    }

    pub async fn search_forums(&self, query: &str) -> Result<Vec<Forum>> {
        let forums = self.repo.search_forums(query.trim()).await?;
        debug!(query, hits = forums.len(), "forum search");
        Ok(forums)
    }

    pub async fn search_threads_in_course(&self, course_id: &str, query: &str) -> Result<Vec<Thread>> {
        let course_id = course_id.trim();
        let threads = self.repo.search_threads(course_id, query.trim()).await?;
        debug!(course_id, query, hits = threads.len(), "thread search");
        Ok(threads)
    }

    pub async fn search_courses(&self, query: &str) -> Result<Vec<CourseSummary>> {
        let courses = self.courses.search_courses(query.trim()).await?;
        debug!(query, hits = courses.len(), "course search");
        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockCourseCatalog, MockForumRepository};

    fn service(repo: MockForumRepository, courses: MockCourseCatalog) -> ForumService {
        ForumService::new(Arc::new(repo), Arc::new(courses))
    }

    #[tokio::test]
    async fn test_create_forum_trims_and_starts_empty() {
        let mut repo = MockForumRepository::new();
        repo.expect_insert_forum()
            .withf(|forum| forum.course_id == "C1" && forum.course_name == "Algorithms")
            .times(1)
            .returning(Ok);

        let forum = service(repo, MockCourseCatalog::new())
            .create_forum(" C1 ", "Algorithms ")
            .await
            .unwrap();
        assert!(forum.threads.is_empty());
    }

    #[tokio::test]
    async fn test_create_forum_rejects_blank_name_without_touching_store() {
        let mut repo = MockForumRepository::new();
        repo.expect_insert_forum().never();

        let err = service(repo, MockCourseCatalog::new())
            .create_forum("C1", "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("courseName")));
    }

    #[tokio::test]
    async fn test_create_forum_passes_duplicate_through() {
        let mut repo = MockForumRepository::new();
        repo.expect_insert_forum()
            .returning(|forum| Err(DomainError::duplicate_forum(&forum.course_id)));

        let err = service(repo, MockCourseCatalog::new())
            .create_forum("C1", "Algorithms")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_create_forum_rejects_reserved_course_id() {
        let mut repo = MockForumRepository::new();
        repo.expect_insert_forum().never();

        let err = service(repo, MockCourseCatalog::new())
            .create_forum("course", "Algorithms")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("reserved")));
    }

    #[tokio::test]
    async fn test_lookups_trim_course_id() {
        let mut repo = MockForumRepository::new();
        repo.expect_get_forum()
            .withf(|course_id| course_id == "C1")
            .returning(|_| Ok(Some(Forum::new("C1", "Algorithms"))));
        repo.expect_append_thread()
            .withf(|course_id, _| course_id == "C1")
            .returning(|_, thread| Ok(thread));

        let service = service(repo, MockCourseCatalog::new());
        let forum = service.get_forum_by_course(" C1 ").await.unwrap();
        assert_eq!(forum.course_id, "C1");
        service.add_thread("C1 ", "Help", "", "U1").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_forum_missing_is_not_found() {
        let mut repo = MockForumRepository::new();
        repo.expect_get_forum().returning(|_| Ok(None));

        let err = service(repo, MockCourseCatalog::new())
            .get_forum_by_course("nope")
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::forum_not_found("nope"));
    }

    #[tokio::test]
    async fn test_add_thread_stamps_fresh_thread() {
        let mut repo = MockForumRepository::new();
        repo.expect_append_thread()
            .withf(|course_id, thread| {
                course_id == "C1"
                    && thread.title == "Help"
                    && thread.description == "need help"
                    && thread.created_by == "U1"
                    && thread.replies.is_empty()
            })
            .times(1)
            .returning(|_, thread| Ok(thread));

        let before = chrono::Utc::now();
        let thread = service(repo, MockCourseCatalog::new())
            .add_thread("C1", "Help", " need help ", "U1")
            .await
            .unwrap();
        assert!(thread.created_at >= before);
    }

    #[tokio::test]
    async fn test_add_thread_allows_empty_description() {
        let mut repo = MockForumRepository::new();
        repo.expect_append_thread().returning(|_, thread| Ok(thread));

        let thread = service(repo, MockCourseCatalog::new())
            .add_thread("C1", "Help", "", "U1")
            .await
            .unwrap();
        assert_eq!(thread.description, "");
    }

    #[tokio::test]
    async fn test_add_thread_rejects_oversized_title() {
        let mut repo = MockForumRepository::new();
        repo.expect_append_thread().never();

        let title = "x".repeat(MAX_TITLE_LEN + 1);
        let err = service(repo, MockCourseCatalog::new())
            .add_thread("C1", &title, "", "U1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_reply_requires_message() {
        let mut repo = MockForumRepository::new();
        repo.expect_append_reply().never();

        let err = service(repo, MockCourseCatalog::new())
            .add_reply("C1", Uuid::now_v7(), "U2", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("message")));
    }

    #[tokio::test]
    async fn test_search_courses_delegates_trimmed_query() {
        let mut courses = MockCourseCatalog::new();
        courses
            .expect_search_courses()
            .withf(|query| query == "algo")
            .returning(|_| {
                Ok(vec![CourseSummary {
                    course_id: "C1".into(),
                    course_name: "Algorithms".into(),
                }])
            });

        let found = service(MockForumRepository::new(), courses)
            .search_courses("  algo ")
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].course_id, "C1");
    }
}
