//! End-to-end checks against a live listener.

use integration_tests::server;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_algorithms_scenario_over_http() {
    let addr = server::spawn().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/forums"))
        .json(&json!({"courseId": "C1", "courseName": "Algorithms"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let thread: Value = client
        .post(format!("{base}/forums/C1/threads"))
        .json(&json!({"title": "Help", "description": "need help", "createdBy": "U1"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let thread_id = thread["threadId"].as_str().unwrap();

    let response = client
        .post(format!("{base}/forums/C1/threads/{thread_id}/replies"))
        .json(&json!({"userId": "U2", "message": "sure"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let forum: Value = client
        .get(format!("{base}/forums/course/C1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let threads = forum["threads"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["replies"][0]["message"], "sure");
}

#[tokio::test]
async fn test_listing_and_missing_forum() {
    let addr = server::spawn().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let forums: Value = client
        .get(format!("{base}/forums"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(forums, json!([]));

    let response = client
        .get(format!("{base}/forums/course/C404"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}
