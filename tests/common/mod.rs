// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Shared test helpers: app construction against a fake platform API.

use axum::http::header;
use axum::response::Response;
use axum::Router;
use sattva_auth::config::Config;
use sattva_auth::middleware::session::{encode_session, SESSION_COOKIE};
use sattva_auth::models::session::TokenState;
use sattva_auth::routes::create_router;
use sattva_auth::services::{BackendClient, SessionLifecycle};
use sattva_auth::AppState;
use std::sync::Arc;

/// Spawn a fake platform API on an ephemeral port; returns its base URL.
///
/// The listener is bound before the task is spawned, so requests issued
/// immediately afterwards queue in the accept backlog.
#[allow(dead_code)]
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fake backend");
    });

    format!("http://{}", addr)
}

/// Create a test app wired to the given backend URL.
#[allow(dead_code)]
pub fn create_test_app(backend_url: &str) -> (Router, Arc<AppState>) {
    create_test_app_with_frontend_url(backend_url, "http://localhost:3000")
}

/// Create a test app with a frontend origin override (cookie attribute tests).
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(
    backend_url: &str,
    frontend_url: &str,
) -> (Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.api_url = backend_url.to_string();
    config.frontend_url = frontend_url.to_string();

    let backend = BackendClient::new(config.api_url.clone()).expect("build backend client");
    let lifecycle = SessionLifecycle::new(backend);

    let state = Arc::new(AppState { config, lifecycle });
    (create_router(state.clone()), state)
}

/// Forge a `Cookie` header value carrying the given token state.
#[allow(dead_code)]
pub fn session_cookie_header(state: &TokenState, config: &Config) -> String {
    let jwt = encode_session(state, &config.session_signing_key, config.session_max_age_days)
        .expect("encode session");
    format!("{}={}", SESSION_COOKIE, jwt)
}

/// All `Set-Cookie` headers on a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The session `Set-Cookie` header, if any.
#[allow(dead_code)]
pub fn session_set_cookie(response: &Response) -> Option<String> {
    set_cookie_headers(response)
        .into_iter()
        .find(|value| value.starts_with(&format!("{}=", SESSION_COOKIE)))
}

/// Extract the raw cookie value from a `Set-Cookie` header.
#[allow(dead_code)]
pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

/// Read and parse a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}
