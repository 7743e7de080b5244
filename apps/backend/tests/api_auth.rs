//! Login, session, and password reset API tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use common::{TestContext, TEST_PASSWORD};
use quiz_backend::models::Role;

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    ctx.create_user("alice", Role::User);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": TEST_PASSWORD }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"]["lastLogin"].is_string());
    assert!(body["user"].get("passwordHash").is_none());

    let token = body["token"].as_str().unwrap();
    let me = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(token))
        .await;
    me.assert_status_ok();
    assert_eq!(me.json::<serde_json::Value>()["username"], "alice");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    ctx.create_user("alice", Role::User);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "nope-nope" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    server
        .get("/api/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, TestContext::auth_header_value("bogus"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_user("alice", Role::User);

    server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .assert_status_ok();

    server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_checks_current() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_user("alice", Role::User);

    server
        .post("/api/auth/change-password")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "currentPassword": "wrong-one", "newPassword": "brand-new" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/api/auth/change-password")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({ "currentPassword": TEST_PASSWORD, "newPassword": "brand-new" }))
        .await
        .assert_status_ok();

    server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "brand-new" }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_forgot_password_unknown_email_still_succeeds() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": "ghost@example.com" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<serde_json::Value>()["success"], true);
    assert_eq!(ctx.notifier.sent_count(), 0);
}

#[tokio::test]
async fn test_reset_password_flow() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, _) = ctx.create_user("alice", Role::User);

    server
        .post("/api/auth/forgot-password")
        .json(&json!({ "email": "alice@example.com" }))
        .await
        .assert_status_ok();
    let token = ctx.notifier.last_token_for(alice.id).unwrap();
    assert_eq!(token.len(), 64);

    server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "newPassword": "reset-pass" }))
        .await
        .assert_status_ok();

    server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "reset-pass" }))
        .await
        .assert_status_ok();

    // A token redeems once.
    server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": token, "newPassword": "again-pass" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_second_reset_request_invalidates_first_token() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (alice, _) = ctx.create_user("alice", Role::User);

    for _ in 0..2 {
        server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "alice@example.com" }))
            .await
            .assert_status_ok();
    }
    let tokens = ctx.notifier.tokens_for(alice.id);
    assert_eq!(tokens.len(), 2);

    let first = ctx.db.get_reset_token(&tokens[0]).unwrap().unwrap();
    assert!(first.used);

    server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": tokens[0], "newPassword": "reset-pass" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/auth/reset-password")
        .json(&json!({ "token": tokens[1], "newPassword": "reset-pass" }))
        .await
        .assert_status_ok();
}
