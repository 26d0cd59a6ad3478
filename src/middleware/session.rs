// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Signed session cookie codec.
//!
//! The entire token state travels inside an HS256 JWT held by the client;
//! the server keeps no session store. Tampered, expired or otherwise
//! invalid cookies read as "no session".

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::models::session::TokenState;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "sattva_session";

/// Claims wrapping the token state inside the session JWT.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// Cookie-level expiry (Unix timestamp). Independent of the access
    /// token expiry carried inside the state.
    exp: usize,
    /// Issued at (Unix timestamp)
    iat: usize,
    #[serde(flatten)]
    state: TokenState,
}

/// Encode a token state into a signed session JWT.
pub fn encode_session(
    state: &TokenState,
    signing_key: &[u8],
    max_age_days: i64,
) -> anyhow::Result<String> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = SessionClaims {
        exp: now + (max_age_days.max(0) as usize) * 24 * 60 * 60,
        iat: now,
        state: state.clone(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Decode a session JWT back into a token state.
pub fn decode_session(token: &str, signing_key: &[u8]) -> Option<TokenState> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims.state)
        .ok()
}

/// Read the token state from the request cookie jar.
pub fn session_from_jar(jar: &CookieJar, signing_key: &[u8]) -> Option<TokenState> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| decode_session(cookie.value(), signing_key))
}

/// Create the session cookie.
pub fn session_cookie(value: String, secure: bool, max_age_days: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::days(max_age_days))
        .build()
}

/// Create the removal cookie. Attributes must match the creation attributes
/// for browsers to actually drop it.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}
