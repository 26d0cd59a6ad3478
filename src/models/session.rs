//! Session token state and its projection to the frontend-visible session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::services::backend::{BackendUser, LoginResponse, RefreshResponse};

/// Access token lifetime assumed when a login response omits `expires_in`.
pub const DEFAULT_LOGIN_TTL_SECS: i64 = 30 * 60;

/// Fixed validity window applied to a refreshed access token.
pub const REFRESHED_TTL_SECS: i64 = 30 * 60;

/// Terminal session errors carried in the token state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SessionError {
    /// The refresh token itself was rejected; only a fresh login recovers.
    #[serde(rename = "RefreshAccessTokenError")]
    RefreshAccessToken,
}

/// Denormalized user snapshot taken at login and replaced wholesale on an
/// explicit profile update. Never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<BackendUser> for UserSnapshot {
    fn from(user: BackendUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
        }
    }
}

/// The persisted unit of session state, embedded in the signed session
/// cookie held by the client.
///
/// Invariant: when `error` is set, all three token fields are cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Unix seconds; strictly in the future at the moment it is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,

    /// Email captured at login; projection fallback when the snapshot
    /// lacks one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSnapshot>,
}

impl TokenState {
    /// Initial state from a successful login.
    pub fn from_login(response: LoginResponse, now: DateTime<Utc>) -> Self {
        let ttl = response.expires_in.unwrap_or(DEFAULT_LOGIN_TTL_SECS);
        let email = response.user.email.clone();

        Self {
            access_token: Some(response.access_token),
            refresh_token: Some(response.refresh_token),
            access_token_expires_at: Some(now.timestamp() + ttl),
            error: None,
            email,
            user: Some(response.user.into()),
        }
    }

    /// Apply a successful refresh: new access token, refresh token rotated
    /// only when the response carries one, fixed expiry window, error
    /// cleared.
    pub fn with_refresh(self, response: &RefreshResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: Some(response.access.clone()),
            refresh_token: response.refresh.clone().or(self.refresh_token),
            access_token_expires_at: Some(now.timestamp() + REFRESHED_TTL_SECS),
            error: None,
            email: self.email,
            user: self.user,
        }
    }

    /// Terminal transition after a rejected refresh token. Tokens are
    /// cleared; the user snapshot survives so the frontend can still show
    /// who needs to log back in.
    pub fn into_errored(self) -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            access_token_expires_at: None,
            error: Some(SessionError::RefreshAccessToken),
            email: self.email,
            user: self.user,
        }
    }

    /// Replace the user snapshot wholesale.
    pub fn with_user(self, user: BackendUser) -> Self {
        Self {
            user: Some(user.into()),
            ..self
        }
    }
}

/// User object inside the projected session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// The session object consumed by the rest of the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionError>,

    pub user: Option<SessionUser>,
}

/// Project the internal token state into the externally visible session.
///
/// Pure. On error, every token field is omitted even if stray values are
/// still physically present in the input.
pub fn project(state: &TokenState) -> Session {
    let user = state.user.as_ref().map(|snapshot| SessionUser {
        id: snapshot.id.clone(),
        email: snapshot.email.clone().or_else(|| state.email.clone()),
        name: snapshot.name.clone(),
        image: snapshot.image.clone(),
    });

    if state.error.is_some() {
        return Session {
            access_token: None,
            refresh_token: None,
            access_token_expires_at: None,
            error: state.error,
            user,
        };
    }

    Session {
        access_token: state.access_token.clone(),
        refresh_token: state.refresh_token.clone(),
        access_token_expires_at: state.access_token_expires_at,
        error: None,
        user,
    }
}
