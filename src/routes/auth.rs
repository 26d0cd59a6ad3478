// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Session lifecycle routes consumed by the frontend.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::session::{
    clear_session_cookie, encode_session, session_cookie, session_from_jar, SESSION_COOKIE,
};
use crate::models::session::{project, Session, TokenState};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/session", get(get_session))
        .route("/auth/session/update", post(update_session))
        .route("/auth/logout", post(logout))
}

/// Login request body.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Exchange credentials for a session.
///
/// Denied logins are indistinguishable from each other: always a bare 401,
/// whatever the backend said.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Session>)> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let Some(token_state) = state
        .lifecycle
        .authenticate(&payload.email, &payload.password)
        .await
    else {
        return Err(AppError::Unauthorized);
    };

    let jar = issue_cookie(jar, &token_state, &state)?;
    Ok((jar, Json(project(&token_state))))
}

/// Current session.
///
/// Runs the refresh coordinator and re-issues the cookie whenever the
/// carried state changed. No or invalid cookie reads as `null`.
async fn get_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Option<Session>>)> {
    let Some(current) = session_from_jar(&jar, &state.config.session_signing_key) else {
        return Ok((drop_stale_cookie(jar, &state), Json(None)));
    };

    let next = state.lifecycle.resolve(current.clone()).await;
    let jar = if next != current {
        issue_cookie(jar, &next, &state)?
    } else {
        jar
    };

    Ok((jar, Json(Some(project(&next)))))
}

/// Force-update trigger: re-fetch the user profile from the platform API.
async fn update_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Option<Session>>)> {
    let Some(current) = session_from_jar(&jar, &state.config.session_signing_key) else {
        return Ok((drop_stale_cookie(jar, &state), Json(None)));
    };

    let next = state.lifecycle.update_profile(current.clone()).await;
    let jar = if next != current {
        issue_cookie(jar, &next, &state)?
    } else {
        jar
    };

    Ok((jar, Json(Some(project(&next)))))
}

/// Logout. The only server-side session state is the cookie itself.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.add(clear_session_cookie(state.config.secure_cookies()));
    (jar, StatusCode::NO_CONTENT)
}

/// Sign the state into a fresh session cookie.
fn issue_cookie(jar: CookieJar, token_state: &TokenState, state: &AppState) -> Result<CookieJar> {
    let jwt = encode_session(
        token_state,
        &state.config.session_signing_key,
        state.config.session_max_age_days,
    )
    .map_err(AppError::Internal)?;

    Ok(jar.add(session_cookie(
        jwt,
        state.config.secure_cookies(),
        state.config.session_max_age_days,
    )))
}

/// Clear a cookie that was present but failed to decode.
fn drop_stale_cookie(jar: CookieJar, state: &AppState) -> CookieJar {
    if jar.get(SESSION_COOKIE).is_some() {
        jar.add(clear_session_cookie(state.config.secure_cookies()))
    } else {
        jar
    }
}
