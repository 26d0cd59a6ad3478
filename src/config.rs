//! Application configuration loaded from environment variables.
//!
//! Everything is resolved once at startup and passed down; nothing reads the
//! process environment at call time.

use std::env;

/// Platform API address used when neither URL variable is set.
const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform API (the Django backend)
    pub api_url: String,
    /// Frontend origin, used for CORS and cookie security
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// HS256 signing key for session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Session cookie lifetime in days
    pub session_max_age_days: i64,
}

/// Resolve the platform API base URL from an explicit lookup capability.
///
/// Precedence: `INTERNAL_API_URL`, then `NEXT_PUBLIC_API_URL` (the variable
/// shared with the frontend build), then the local development default.
/// Trailing slashes are trimmed so endpoint paths join cleanly.
pub fn resolve_api_url<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("INTERNAL_API_URL")
        .or_else(|| lookup("NEXT_PUBLIC_API_URL"))
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            api_url: resolve_api_url(|name| {
                env::var(name).ok().filter(|value| !value.trim().is_empty())
            }),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
            session_max_age_days: env::var("SESSION_MAX_AGE_DAYS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Whether session cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
            session_max_age_days: 30,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
