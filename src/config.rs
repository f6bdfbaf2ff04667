//! Runtime configuration loaded from the environment.

use anyhow::{Context, Result};
use std::env;

// Defaults for everything except the bot token, which has no sane default
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800; // 30 minutes
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Configuration for the notes bot
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token
    pub bot_token: String,
    /// Base URL of the notes REST backend
    pub backend_url: String,
    /// Redis connection URL for the session cache
    pub redis_url: String,
    /// Session credential TTL in seconds
    pub session_ttl_secs: u64,
    /// Per-request timeout for backend calls in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `BOT_TOKEN` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?;

        let backend_url =
            env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse()
                .context("SESSION_TTL_SECS must be a number of seconds")?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };
        let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            bot_token,
            backend_url,
            redis_url,
            session_ttl_secs,
            request_timeout_secs,
        })
    }
}
