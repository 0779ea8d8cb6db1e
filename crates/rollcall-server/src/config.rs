//! Bot configuration loaded from environment variables.
//!
//! Every setting except the Telegram token has a default, so `show` works
//! with zero configuration.

use std::path::PathBuf;

use rollcall_shared::constants::DEFAULT_MAX_PARTICIPANTS;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bot API token.
    /// Env: `TELEGRAM_TOKEN`
    /// Default: none (required to run the server).
    pub telegram_token: Option<String>,

    /// Path of the roster database file.
    /// Env: `STORE_PATH`
    /// Default: platform data directory.
    pub store_path: Option<PathBuf>,

    /// Roster size limit per chat.
    /// Env: `MAX_PARTICIPANTS`
    /// Default: `100`
    pub max_participants: usize,

    /// Base URL of the Bot API.
    /// Env: `TELEGRAM_API_URL`
    /// Default: `https://api.telegram.org`
    pub api_url: String,

    /// Long-poll timeout for `getUpdates`, in seconds.
    /// Env: `POLL_TIMEOUT_SECS`
    /// Default: `60`
    pub poll_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            store_path: None,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("telegram_token", &self.telegram_token.as_ref().map(|_| "<redacted>"))
            .field("store_path", &self.store_path)
            .field("max_participants", &self.max_participants)
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(token) = var("TELEGRAM_TOKEN") {
            if !token.is_empty() {
                config.telegram_token = Some(token);
            }
        }

        if let Some(path) = var("STORE_PATH") {
            if !path.is_empty() {
                config.store_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = var("MAX_PARTICIPANTS") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_participants = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_PARTICIPANTS, using default"),
            }
        }

        if let Some(url) = var("TELEGRAM_API_URL") {
            config.api_url = url;
        }

        if let Some(val) = var("POLL_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(n) => config.poll_timeout_secs = n,
                Err(_) => tracing::warn!(value = %val, "Invalid POLL_TIMEOUT_SECS, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}
