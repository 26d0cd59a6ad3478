// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Credential login flow tests against a fake platform API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use sattva_auth::middleware::session::decode_session;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{
    body_json, cookie_value, create_test_app, session_set_cookie, spawn_backend,
};

const LOGIN_PATH: &str = "/api/v1/auth/login/";

fn login_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Fake backend whose login endpoint counts hits and returns `response`.
fn login_backend(hits: Arc<AtomicUsize>, response: serde_json::Value) -> Router {
    Router::new().route(
        LOGIN_PATH,
        post(move || {
            let hits = hits.clone();
            let response = response.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(response)
            }
        }),
    )
}

#[tokio::test]
async fn test_login_issues_session_and_cookie() {
    let hits = Arc::new(AtomicUsize::new(0));
    let backend = login_backend(
        hits.clone(),
        json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "expires_in": 1800,
            "user": {"id": 7, "email": "a@b.com"}
        }),
    );
    let backend_url = spawn_backend(backend).await;
    let (app, state) = create_test_app(&backend_url);

    let response = app
        .oneshot(login_request(json!({"email": "a@b.com", "password": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = session_set_cookie(&response).expect("session cookie set");
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(!set_cookie.contains("Secure"));

    let body = body_json(response).await;
    assert_eq!(body["accessToken"], "A1");
    assert_eq!(body["refreshToken"], "R1");
    assert_eq!(body["user"]["id"], "7");
    assert_eq!(body["user"]["email"], "a@b.com");
    assert!(body.get("error").is_none());

    let expires_at = body["accessTokenExpiresAt"].as_i64().unwrap();
    let now = Utc::now().timestamp();
    assert!(
        (expires_at - now - 1800).abs() <= 5,
        "expected ~1800s lifetime, got {}",
        expires_at - now
    );

    let decoded = decode_session(&cookie_value(&set_cookie), &state.config.session_signing_key)
        .expect("cookie decodes");
    assert_eq!(decoded.access_token.as_deref(), Some("A1"));
    assert_eq!(decoded.refresh_token.as_deref(), Some("R1"));
    assert_eq!(decoded.email.as_deref(), Some("a@b.com"));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_login_defaults_ttl_when_expires_in_missing() {
    let hits = Arc::new(AtomicUsize::new(0));
    let backend = login_backend(
        hits,
        json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "user": {"id": 7}
        }),
    );
    let backend_url = spawn_backend(backend).await;
    let (app, _state) = create_test_app(&backend_url);

    let response = app
        .oneshot(login_request(json!({"email": "a@b.com", "password": "x"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let expires_at = body["accessTokenExpiresAt"].as_i64().unwrap();
    let now = Utc::now().timestamp();
    // Default window is 30 minutes.
    assert!((expires_at - now - 1800).abs() <= 5);
}

#[tokio::test]
async fn test_login_honors_server_declared_ttl() {
    let hits = Arc::new(AtomicUsize::new(0));
    let backend = login_backend(
        hits,
        json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "expires_in": 900,
            "user": {"id": 7}
        }),
    );
    let backend_url = spawn_backend(backend).await;
    let (app, _state) = create_test_app(&backend_url);

    let response = app
        .oneshot(login_request(json!({"email": "a@b.com", "password": "x"})))
        .await
        .unwrap();

    let body = body_json(response).await;
    let expires_at = body["accessTokenExpiresAt"].as_i64().unwrap();
    let now = Utc::now().timestamp();
    assert!((expires_at - now - 900).abs() <= 5);
}

#[tokio::test]
async fn test_denied_login_yields_no_session() {
    let backend = Router::new().route(LOGIN_PATH, post(|| async { StatusCode::UNAUTHORIZED }));
    let backend_url = spawn_backend(backend).await;
    let (app, _state) = create_test_app(&backend_url);

    let response = app
        .oneshot(login_request(json!({"email": "a@b.com", "password": "wrong"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_set_cookie(&response).is_none());

    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_malformed_login_response_is_denied() {
    let hits = Arc::new(AtomicUsize::new(0));
    let backend = login_backend(hits, json!({"unexpected": true}));
    let backend_url = spawn_backend(backend).await;
    let (app, _state) = create_test_app(&backend_url);

    let response = app
        .oneshot(login_request(json!({"email": "a@b.com", "password": "x"})))
        .await
        .unwrap();

    // Same surface as a rejected credential: no partial state leaks.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_set_cookie(&response).is_none());
}

#[tokio::test]
async fn test_invalid_email_rejected_without_backend_call() {
    let hits = Arc::new(AtomicUsize::new(0));
    let backend = login_backend(hits.clone(), json!({}));
    let backend_url = spawn_backend(backend).await;
    let (app, _state) = create_test_app(&backend_url);

    let response = app
        .oneshot(login_request(json!({"email": "not-an-email", "password": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_password_rejected() {
    let hits = Arc::new(AtomicUsize::new(0));
    let backend = login_backend(hits.clone(), json!({}));
    let backend_url = spawn_backend(backend).await;
    let (app, _state) = create_test_app(&backend_url);

    let response = app
        .oneshot(login_request(json!({"email": "a@b.com", "password": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
