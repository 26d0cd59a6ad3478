// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! HTTP client for the platform API (the Django backend).
//!
//! Owns the three calls the session lifecycle depends on:
//! - Credential login
//! - Access token refresh (with optional refresh token rotation)
//! - Current-user profile fetch
//!
//! Transport and parse failures are folded into [`BackendError`] at this
//! boundary; nothing propagates as an uncaught error to callers.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Deadline on every outbound call so a hung backend cannot stall a
/// session read.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from platform API calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 401/403 - the presented credential or token was rejected.
    #[error("credentials or token rejected by the platform API")]
    Unauthorized,

    /// Any other non-success status.
    #[error("platform API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The request never completed (connect failure, timeout, ...).
    #[error("platform API request failed: {0}")]
    Transport(String),

    /// 2xx with a body we could not parse.
    #[error("unexpected platform API response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// True when the failure means the credential itself is invalid, as
    /// opposed to a transient backend problem.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, BackendError::Unauthorized)
    }
}

/// Platform API client.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new client for the given base URL.
    pub fn new(base_url: String) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange credentials for an initial token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let url = format!("{}/api/v1/auth/login/", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Obtain a new access token for a refresh token.
    ///
    /// The backend rotates the refresh token only sometimes; `refresh` is
    /// absent from the response otherwise.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, BackendError> {
        let url = format!("{}/api/v1/auth/token/refresh/", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Fetch the current user profile with a bearer access token.
    pub async fn me(&self, access_token: &str) -> Result<BackendUser, BackendError> {
        let url = format!("{}/api/v1/auth/me/", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        // Rejected credential/token - callers treat this differently from
        // transient failures
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(BackendError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))
    }
}

/// Login response from the platform API.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds; some deployments omit it.
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: BackendUser,
}

/// Token refresh response.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    /// Present only when the backend rotated the refresh token.
    #[serde(default)]
    pub refresh: Option<String>,
}

/// User profile as served by the platform API.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendUser {
    /// Django serializes numeric primary keys; coerced to string here.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Accept either a JSON number or string for the user id.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n.to_string(),
        Raw::Str(s) => s,
    })
}
