//! Progress rollup API tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use common::fixtures;
use common::TestContext;
use quiz_backend::models::Role;

#[tokio::test]
async fn test_first_read_returns_empty_rollup() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, token) = ctx.create_user("alice", Role::User);

    let response = server
        .get(&format!("/api/users/{}/progress", alice.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["userId"], alice.id);
    assert_eq!(body["totalAnswered"], 0);
    assert_eq!(body["questionsAnswered"], json!([]));
    assert_eq!(body["categoryProgress"], json!({}));
}

#[tokio::test]
async fn test_write_then_read_returns_document_verbatim() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, token) = ctx.create_user("alice", Role::User);
    let path = format!("/api/users/{}/progress", alice.id);

    let write = server
        .put(&path)
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::progress_document(10, 7))
        .await;
    write.assert_status_ok();
    assert_eq!(write.json::<serde_json::Value>()["success"], true);

    let body: serde_json::Value = server
        .get(&path)
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(body["totalAnswered"], 10);
    assert_eq!(body["totalCorrect"], 7);
    assert_eq!(body["markedForReview"], json!(["q2"]));
    assert_eq!(body["categoryProgress"]["routing"], json!({ "correct": 7, "total": 10 }));
    assert_eq!(body["streak"], 3);
}

#[tokio::test]
async fn test_last_writer_wins() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, token) = ctx.create_user("alice", Role::User);
    let path = format!("/api/users/{}/progress", alice.id);

    for (answered, correct) in [(10, 7), (4, 1)] {
        server
            .put(&path)
            .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
            .json(&fixtures::progress_document(answered, correct))
            .await
            .assert_status_ok();
    }

    let body: serde_json::Value = server
        .get(&path)
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(body["totalAnswered"], 4);
    assert_eq!(body["totalCorrect"], 1);
}

#[tokio::test]
async fn test_malformed_tally_rejected() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, token) = ctx.create_user("alice", Role::User);

    let response = server
        .put(&format!("/api/users/{}/progress", alice.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "categoryProgress": { "routing": { "correct": 5, "total": 2 } } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<serde_json::Value>()["error"], "validation_error");
}

#[tokio::test]
async fn test_write_for_missing_user_is_not_found() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, admin_token) = ctx.create_admin();

    server
        .put("/api/users/9999/progress")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin_token))
        .json(&fixtures::progress_document(1, 1))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_users_progress_is_forbidden() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, _) = ctx.create_user("alice", Role::User);
    let (_, bob_token) = ctx.create_user("bob", Role::User);
    let (_, admin_token) = ctx.create_admin();
    let path = format!("/api/users/{}/progress", alice.id);

    server
        .get(&path)
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&bob_token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .get(&path)
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&admin_token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_drift_reports_rollup_against_log() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, token) = ctx.create_user("alice", Role::User);

    server
        .post(&format!("/api/users/{}/answers", alice.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::answer_request("q1", true))
        .await
        .assert_status_ok();

    let drift: serde_json::Value = server
        .get(&format!("/api/users/{}/progress/drift", alice.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(drift["rollup"], json!({ "answered": 0, "correct": 0 }));
    assert_eq!(drift["eventLog"], json!({ "answered": 1, "correct": 1 }));
    assert_eq!(drift["inSync"], false);

    server
        .put(&format!("/api/users/{}/progress", alice.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "totalAnswered": 1, "totalCorrect": 1 }))
        .await
        .assert_status_ok();

    let drift: serde_json::Value = server
        .get(&format!("/api/users/{}/progress/drift", alice.id))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(drift["inSync"], true);
}
