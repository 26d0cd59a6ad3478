// SPDX-License-Identifier: MIT
// Copyright 2026 Sattva Labs <dev@sattva.health>

//! Sattva Auth API Server
//!
//! Bridges the web frontend and the platform API: exchanges credentials for
//! token pairs, keeps access tokens fresh, and carries the whole session in
//! a signed client-held cookie.

use sattva_auth::{
    config::Config,
    services::{BackendClient, SessionLifecycle},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        api_url = %config.api_url,
        "Starting Sattva auth gateway"
    );

    // Platform API client + lifecycle coordinator
    let backend =
        BackendClient::new(config.api_url.clone()).expect("Failed to build platform API client");
    let lifecycle = SessionLifecycle::new(backend);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        lifecycle,
    });

    // Build router
    let app = sattva_auth::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sattva_auth=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
