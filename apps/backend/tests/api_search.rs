//! Search API tests against stub providers.

mod common;

use std::sync::atomic::Ordering;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;

use common::{StubProvider, TestContext};
use quiz_backend::models::Role;
use quiz_backend::services::search::fingerprint;
use quiz_core::normalize_query;

#[tokio::test]
async fn test_short_query_is_bad_request() {
    let (serper, calls) = StubProvider::new("serper", false);
    let ctx = TestContext::with_providers(vec![Box::new(serper)]);
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_user("alice", Role::User);

    let response = server
        .get("/api/search")
        .add_query_param("q", " x ")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_provider_is_unavailable() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_user("alice", Role::User);

    let response = server
        .get("/api/search")
        .add_query_param("q", "spanning tree")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "service_unavailable");
}

#[tokio::test]
async fn test_fallback_serves_and_caches() {
    let (serper, serper_calls) = StubProvider::new("serper", true);
    let (brave, brave_calls) = StubProvider::new("brave", false);
    let ctx = TestContext::with_providers(vec![Box::new(serper), Box::new(brave)]);
    let server = TestServer::new(ctx.router()).unwrap();
    let (_, token) = ctx.create_user("alice", Role::User);

    let first = server
        .get("/api/search")
        .add_query_param("q", "Spanning Tree")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    first.assert_status_ok();
    let body: serde_json::Value = first.json();
    assert_eq!(body["provider"], "brave");
    assert_eq!(body["cached"], false);
    assert_eq!(body["results"][0]["title"], "About spanning tree");

    let second: serde_json::Value = server
        .get("/api/search")
        .add_query_param("q", "  spanning tree ")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await
        .json();
    assert_eq!(second["provider"], "brave");
    assert_eq!(second["cached"], true);

    assert_eq!(serper_calls.load(Ordering::SeqCst), 1);
    assert_eq!(brave_calls.load(Ordering::SeqCst), 1);

    let key = fingerprint(&normalize_query("spanning tree").unwrap());
    assert_eq!(ctx.db.get_cache_entry(&key).unwrap().unwrap().provider, "brave");
}

#[tokio::test]
async fn test_search_requires_session() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router()).unwrap();

    server
        .get("/api/search")
        .add_query_param("q", "ipv6")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
