// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Session token lifecycle: the refresh coordinator.
//!
//! Every session read passes through [`SessionLifecycle::resolve`], which
//! classifies the carried token state and refreshes proactively inside the
//! buffer window. The failure handling is deliberately asymmetric: a
//! rejected refresh token ends the session until the next login, while any
//! other refresh failure leaves the prior state untouched so a transient
//! backend blip never forces a logout.

use chrono::{DateTime, Utc};

use crate::models::session::TokenState;
use crate::services::backend::BackendClient;

/// Margin before access token expiry when we proactively refresh (5 minutes).
/// Guards against the token expiring mid-request due to clock skew or
/// request latency.
pub const REFRESH_BUFFER_SECS: i64 = 5 * 60;

/// Where a token state sits relative to the refresh window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDisposition {
    /// No refresh token to work with; nothing the coordinator can do.
    Missing,
    /// Valid and outside the buffer window.
    Fresh,
    /// Expired, inside the buffer window, or of unknown expiry.
    NearExpiry,
    /// Terminal refresh failure; only a new login resets this.
    Errored,
}

/// Classify a token state at `now`. Pure; drives every transition.
pub fn classify(state: &TokenState, now: DateTime<Utc>) -> TokenDisposition {
    if state.error.is_some() {
        return TokenDisposition::Errored;
    }
    if state.refresh_token.is_none() {
        return TokenDisposition::Missing;
    }
    match state.access_token_expires_at {
        Some(expires_at) if now.timestamp() < expires_at - REFRESH_BUFFER_SECS => {
            TokenDisposition::Fresh
        }
        _ => TokenDisposition::NearExpiry,
    }
}

/// Coordinates the token lifecycle against the platform API.
///
/// Each request carries its own copy of the state inside the session
/// cookie, so there is no shared mutable store here and nothing to lock.
#[derive(Clone)]
pub struct SessionLifecycle {
    backend: BackendClient,
}

impl SessionLifecycle {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    // ─── Login ───────────────────────────────────────────────────────────

    /// Exchange credentials for an initial token state.
    ///
    /// Any failure (rejected credentials, transport error, malformed body)
    /// yields `None`; no partial state is ever produced and nothing is
    /// thrown past this boundary.
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<TokenState> {
        match self.backend.login(email, password).await {
            Ok(response) => {
                let state = TokenState::from_login(response, Utc::now());
                tracing::info!(
                    user_id = state.user.as_ref().map(|u| u.id.as_str()).unwrap_or(""),
                    "login succeeded"
                );
                Some(state)
            }
            Err(err) => {
                tracing::warn!(error = %err, "login denied");
                None
            }
        }
    }

    // ─── Session reads ───────────────────────────────────────────────────

    /// Resolve the state carried by a session read.
    ///
    /// Fresh, errored and empty states return immediately with no network
    /// call; only a near-expiry state goes out to the backend.
    pub async fn resolve(&self, state: TokenState) -> TokenState {
        let now = Utc::now();
        match classify(&state, now) {
            TokenDisposition::Fresh | TokenDisposition::Missing | TokenDisposition::Errored => {
                state
            }
            TokenDisposition::NearExpiry => self.refresh_once(state, now).await,
        }
    }

    /// Perform the refresh leg.
    ///
    /// 401/403 means the refresh token itself is dead: clear everything and
    /// mark the state. Anything else returns the input verbatim so the next
    /// read simply retries.
    async fn refresh_once(&self, state: TokenState, now: DateTime<Utc>) -> TokenState {
        let Some(refresh_token) = state.refresh_token.clone() else {
            return state;
        };

        match self.backend.refresh(&refresh_token).await {
            Ok(response) => {
                tracing::info!(rotated = response.refresh.is_some(), "access token refreshed");
                state.with_refresh(&response, now)
            }
            Err(err) if err.is_auth_rejection() => {
                tracing::warn!(error = %err, "refresh token rejected, ending session");
                state.into_errored()
            }
            Err(err) => {
                tracing::warn!(error = %err, "transient refresh failure, keeping prior tokens");
                state
            }
        }
    }

    // ─── Profile update ──────────────────────────────────────────────────

    /// Force-update trigger: re-fetch the user profile from the platform
    /// API and replace the snapshot wholesale.
    ///
    /// A 401 from the profile fetch routes into the refresh path; after a
    /// successful refresh the fetch is retried once. Transient failures
    /// keep the state unchanged.
    pub async fn update_profile(&self, state: TokenState) -> TokenState {
        let now = Utc::now();
        match classify(&state, now) {
            TokenDisposition::Errored | TokenDisposition::Missing => return state,
            TokenDisposition::Fresh | TokenDisposition::NearExpiry => {}
        }

        let Some(access_token) = state.access_token.clone() else {
            return self.refresh_once(state, now).await;
        };

        match self.backend.me(&access_token).await {
            Ok(user) => state.with_user(user),
            Err(err) if err.is_auth_rejection() => {
                tracing::info!("access token rejected by profile fetch, refreshing");
                let refreshed = self.refresh_once(state.clone(), now).await;

                // Refresh was itself rejected, or failed transiently and
                // left the state as it was
                if refreshed.error.is_some() || refreshed == state {
                    return refreshed;
                }

                match refreshed.access_token.clone() {
                    Some(access) => match self.backend.me(&access).await {
                        Ok(user) => refreshed.with_user(user),
                        Err(err) => {
                            tracing::warn!(
                                error = %err,
                                "profile fetch failed after refresh, keeping prior snapshot"
                            );
                            refreshed
                        }
                    },
                    None => refreshed,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "transient profile fetch failure");
                state
            }
        }
    }
}
