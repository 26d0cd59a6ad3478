// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Sattva auth gateway
//!
//! This crate provides the session token lifecycle for the Sattva wellness
//! marketplace: credential login against the platform API, proactive access
//! token refresh, and signed client-held session cookies consumed by the
//! web frontend.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::SessionLifecycle;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub lifecycle: SessionLifecycle,
}
