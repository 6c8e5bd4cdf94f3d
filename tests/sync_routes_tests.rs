// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP tests for `/sync`.
//!
//! These tests verify that:
//! 1. The sync routes reject missing, invalid, and orphaned tokens
//! 2. Pushed categories come back on pull, scoped per account
//! 3. Oversized bodies are refused

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use gym_sync::config::Config;
use gym_sync::db::MemoryCategoryStore;
use gym_sync::models::{PullResponse, PushResponse};
use gym_sync::routes::create_router;
use gym_sync::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{create_test_app, create_test_jwt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn pull_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/sync");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn push_request(token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/sync")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_pull_without_token_is_unauthorized() {
    let (app, _, _) = create_test_app();

    let response = app.oneshot(pull_request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pull_with_invalid_token_is_unauthorized() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(pull_request(Some("invalid.token.here")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_key_is_unauthorized() {
    let (app, _, _) = create_test_app();
    let token = create_test_jwt("acct-1", b"some_other_signing_key_32_bytes!");

    let response = app.oneshot(pull_request(Some(&token))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_orphaned_token_is_forbidden() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt("  ", &state.config.jwt_signing_key);

    let response = app.oneshot(pull_request(Some(&token))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_new_account_pulls_empty_data() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt("acct-new", &state.config.jwt_signing_key);

    let response = app.oneshot(pull_request(Some(&token))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: PullResponse = body_json(response).await;
    assert!(body.data.is_empty());
    assert!(body.timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_push_then_pull_round_trip() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt("acct-1", &state.config.jwt_signing_key);

    let payload = json!({
        "data": {
            "profiles": [{"id": "p1", "name": "Alex", "theme": "dark"}],
            "history": [{"id": "h1", "profileId": "p1", "workoutId": "w1",
                         "date": "2024-01-01T10:00:00Z", "duration": 3600,
                         "exercises": [], "completedSets": 15}]
        }
    });

    let response = app
        .clone()
        .oneshot(push_request(&token, payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pushed: PushResponse = body_json(response).await;
    assert!(pushed.success);

    let response = app.oneshot(pull_request(Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pulled: PullResponse = body_json(response).await;

    assert_eq!(pulled.data["profiles"], payload["data"]["profiles"]);
    assert_eq!(pulled.data["history"], payload["data"]["history"]);
}

#[tokio::test]
async fn test_push_replaces_category_without_server_merge() {
    let (app, state, store) = create_test_app();
    let token = create_test_jwt("acct-1", &state.config.jwt_signing_key);

    for history in [json!([{"id": "h1"}, {"id": "h2"}]), json!([{"id": "h3"}])] {
        let response = app
            .clone()
            .oneshot(push_request(&token, json!({"data": {"history": history}})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = store.get("acct-1").unwrap();
    assert_eq!(stored["history"], json!([{"id": "h3"}]));
}

#[tokio::test]
async fn test_accounts_are_isolated() {
    let (app, state, _) = create_test_app();
    let owner = create_test_jwt("acct-owner", &state.config.jwt_signing_key);
    let other = create_test_jwt("acct-other", &state.config.jwt_signing_key);

    let response = app
        .clone()
        .oneshot(push_request(&owner, json!({"data": {"profiles": []}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(pull_request(Some(&other))).await.unwrap();
    let body: PullResponse = body_json(response).await;
    assert!(body.data.is_empty());
}

#[tokio::test]
async fn test_push_with_empty_category_name_is_bad_request() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt("acct-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(push_request(&token, json!({"data": {"": []}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_push_without_data_is_rejected() {
    let (app, state, _) = create_test_app();
    let token = create_test_jwt("acct-1", &state.config.jwt_signing_key);

    let response = app
        .oneshot(push_request(&token, json!({"profiles": []})))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_oversized_push_is_rejected() {
    let mut config = Config::test_default();
    config.max_body_bytes = 1024;
    let token = create_test_jwt("acct-1", &config.jwt_signing_key);
    let app = create_router(Arc::new(AppState {
        config,
        store: MemoryCategoryStore::new().into(),
    }));

    let blob = "x".repeat(2048);
    let response = app
        .oneshot(push_request(&token, json!({"data": {"blob": blob}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_failed_store_write_is_server_error() {
    let (app, state, store) = create_test_app();
    let token = create_test_jwt("acct-1", &state.config.jwt_signing_key);
    store.inject_failure_after(1);

    let response = app
        .oneshot(push_request(
            &token,
            json!({"data": {"history": [], "profiles": []}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.get("acct-1").unwrap().is_empty());
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/sync")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
