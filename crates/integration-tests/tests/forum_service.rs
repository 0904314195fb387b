//! Service behaviour over the in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use domains::{DomainError, MockForumRepository};
use integration_tests::{memory_service, random_body, random_title, service_over};
use uuid::Uuid;

#[tokio::test]
async fn test_create_then_get_returns_empty_forum() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();

    let forum = service.get_forum_by_course("C1").await.unwrap();
    assert_eq!(forum.course_id, "C1");
    assert_eq!(forum.course_name, "Algorithms");
    assert!(forum.threads.is_empty());
}

#[tokio::test]
async fn test_padded_course_id_round_trips() {
    let service = memory_service();
    service.create_forum("  C1 ", "Algorithms").await.unwrap();

    let thread = service.add_thread(" C1", "Help", "", "U1").await.unwrap();
    service
        .add_reply("C1  ", thread.thread_id, "U2", "sure")
        .await
        .unwrap();
    let forum = service.get_forum_by_course("  C1 ").await.unwrap();
    assert_eq!(forum.course_id, "C1");
    assert_eq!(forum.threads[0].replies.len(), 1);
    assert_eq!(service.search_threads_in_course(" C1 ", "help").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_create_is_duplicate() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    let err = service.create_forum("C1", "Algorithms").await.unwrap_err();
    assert!(matches!(err, DomainError::Duplicate(_)));
}

#[tokio::test]
async fn test_thread_ids_unique_across_forum_history() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();

    let mut seen = HashSet::new();
    for i in 0..20 {
        let thread = service
            .add_thread("C1", &random_title(), &random_body(), "U1")
            .await
            .unwrap();
        assert!(seen.insert(thread.thread_id));
        if i % 3 == 0 {
            service.delete_thread("C1", thread.thread_id).await.unwrap();
        }
    }

    let forum = service.get_forum_by_course("C1").await.unwrap();
    assert_eq!(forum.threads.len(), 13);
}

#[tokio::test]
async fn test_add_thread_appends_exactly_one() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    let first = service.add_thread("C1", "First", "", "U1").await.unwrap();
    let second = service.add_thread("C1", "Second", "", "U1").await.unwrap();

    let forum = service.get_forum_by_course("C1").await.unwrap();
    let ids: Vec<Uuid> = forum.threads.iter().map(|t| t.thread_id).collect();
    assert_eq!(ids, [first.thread_id, second.thread_id]);
}

#[tokio::test]
async fn test_deleted_thread_never_found_by_search() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    let doomed = service
        .add_thread("C1", "Dynamic programming", "memoization", "U1")
        .await
        .unwrap();
    service
        .add_reply("C1", doomed.thread_id, "U2", "see chapter 15")
        .await
        .unwrap();
    service.add_thread("C1", "Greedy", "exchange argument", "U1").await.unwrap();

    service.delete_thread("C1", doomed.thread_id).await.unwrap();

    for query in ["", "dynamic", "memo"] {
        let hits = service.search_threads_in_course("C1", query).await.unwrap();
        assert!(hits.iter().all(|t| t.title != "Dynamic programming"));
    }
    let err = service.get_thread("C1", doomed.thread_id).await.unwrap_err();
    assert_eq!(err, DomainError::thread_not_found(doomed.thread_id));
}

#[tokio::test]
async fn test_reply_timestamp_not_before_thread() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    let thread = service.add_thread("C1", "Help", "", "U1").await.unwrap();
    let reply = service
        .add_reply("C1", thread.thread_id, "U2", "sure")
        .await
        .unwrap();
    assert!(reply.timestamp >= thread.created_at);

    let stored = service.get_thread("C1", thread.thread_id).await.unwrap();
    assert_eq!(stored.replies, vec![reply]);
}

#[tokio::test]
async fn test_reply_to_missing_thread_or_forum() {
    let service = memory_service();
    let ghost = Uuid::now_v7();
    assert_eq!(
        service.add_reply("C1", ghost, "U2", "hi").await.unwrap_err(),
        DomainError::forum_not_found("C1")
    );

    service.create_forum("C1", "Algorithms").await.unwrap();
    assert_eq!(
        service.add_reply("C1", ghost, "U2", "hi").await.unwrap_err(),
        DomainError::thread_not_found(ghost)
    );
}

#[tokio::test]
async fn test_delete_reply_keeps_siblings() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    let thread = service.add_thread("C1", "Help", "", "U1").await.unwrap();
    let keep = service.add_reply("C1", thread.thread_id, "U2", "one").await.unwrap();
    let removed = service.add_reply("C1", thread.thread_id, "U3", "two").await.unwrap();

    service
        .delete_reply("C1", thread.thread_id, removed.reply_id)
        .await
        .unwrap();

    let stored = service.get_thread("C1", thread.thread_id).await.unwrap();
    assert_eq!(stored.replies, vec![keep]);
}

#[tokio::test]
async fn test_search_forums_empty_and_nonexistent() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    service.create_forum("C2", "Operating Systems").await.unwrap();

    assert_eq!(service.search_forums("").await.unwrap().len(), 2);
    assert!(service.search_forums("xyz-nonexistent").await.unwrap().is_empty());

    let hits = service.search_forums("SYSTEMS").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].course_id, "C2");
}

#[tokio::test]
async fn test_search_threads_in_missing_course() {
    let err = memory_service()
        .search_threads_in_course("C9", "x")
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::forum_not_found("C9"));
}

#[tokio::test]
async fn test_search_courses_uses_catalog() {
    let hits = memory_service().search_courses("algorithms").await.unwrap();
    let ids: Vec<_> = hits.into_iter().map(|c| c.course_id).collect();
    assert_eq!(ids, ["C1", "C3"]);
}

#[tokio::test]
async fn test_algorithms_scenario() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    let thread = service
        .add_thread("C1", "Help", "need help", "U1")
        .await
        .unwrap();
    service
        .add_reply("C1", thread.thread_id, "U2", "sure")
        .await
        .unwrap();

    let forum = service.get_forum_by_course("C1").await.unwrap();
    assert_eq!(forum.threads.len(), 1);
    assert_eq!(forum.threads[0].replies.len(), 1);
    assert_eq!(forum.threads[0].replies[0].message, "sure");
    assert_eq!(forum.threads[0].replies[0].user_id, "U2");
}

#[tokio::test]
async fn test_concurrent_replies_all_land() {
    let service = memory_service();
    service.create_forum("C1", "Algorithms").await.unwrap();
    let thread_id = service.add_thread("C1", "Help", "", "U1").await.unwrap().thread_id;

    let mut handles = Vec::new();
    for i in 0..50 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .add_reply("C1", thread_id, &format!("U{i}"), "me too")
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stored = service.get_thread("C1", thread_id).await.unwrap();
    assert_eq!(stored.replies.len(), 50);
}

#[tokio::test]
async fn test_storage_failure_surfaces_unchanged() {
    let mut repo = MockForumRepository::new();
    repo.expect_list_forums()
        .returning(|| Err(DomainError::Storage("connection reset".into())));

    let err = service_over(Arc::new(repo)).list_forums().await.unwrap_err();
    assert_eq!(err, DomainError::Storage("connection reset".into()));
}
