//! Configuration data structures for cloudlingo.
//!
//! This module defines the schema for the application settings: upstream
//! Google endpoints, authentication, the client-side quota gate and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Upstream Google API settings.
    #[serde(default)]
    pub google: GoogleConfig,

    /// Credentials used by the transport.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Client-side quota throttling.
    #[serde(default)]
    pub rate_limit: RateGateConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the upstream Google REST endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Base URL of the Cloud Translation v2 API.
    /// Default: `https://translation.googleapis.com/language/translate/v2`
    #[serde(default = "default_translate_base_url")]
    pub translate_base_url: String,

    /// Base URL of the Cloud Natural Language v1 API.
    /// Default: `https://language.googleapis.com/v1`
    #[serde(default = "default_language_base_url")]
    pub language_base_url: String,

    /// Base URL of the Cloud Speech-to-Text v1 API.
    /// Default: `https://speech.googleapis.com/v1`
    #[serde(default = "default_speech_base_url")]
    pub speech_base_url: String,

    /// Request timeout in seconds.
    /// Default: `60`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of idle connections to keep per host.
    /// Default: `10`
    #[serde(default = "default_pool_size")]
    pub connection_pool_size: usize,
}

/// How the transport authenticates against Google.
///
/// An API key takes precedence when present; otherwise OAuth2 user
/// credentials are read from `credentials_path`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Google Cloud API key, sent as the `key` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Path to the OAuth2 credentials JSON file.
    /// Default: `~/.cloudlingo/oauth_creds.json`
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    /// Whether to refresh the access token when it is about to expire.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub auto_refresh: bool,

    /// Number of seconds before expiration to trigger a token refresh.
    /// Default: `300` (5 minutes)
    #[serde(default = "default_refresh_buffer")]
    pub refresh_buffer_seconds: i64,

    /// OAuth2 client id used for refresh-token grants.
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret used for refresh-token grants.
    #[serde(default)]
    pub client_secret: String,

    /// Token endpoint for refresh-token grants.
    /// Default: `https://oauth2.googleapis.com/token`
    #[serde(default = "default_token_url")]
    pub token_url: String,
}

// Never print secrets
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("credentials_path", &self.credentials_path)
            .field("auto_refresh", &self.auto_refresh)
            .field("refresh_buffer_seconds", &self.refresh_buffer_seconds)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Settings for the client-side quota gate.
///
/// Google documents the Translation quota as 100 000 characters and
/// 1000 requests per 100 seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateGateConfig {
    /// Characters allowed per window before callers are held back.
    /// Default: `100000`
    #[serde(default = "default_character_limit")]
    pub character_limit: u64,

    /// Length of the accounting window in seconds.
    /// Default: `100`
    #[serde(default = "default_delay_limit")]
    pub delay_limit_seconds: u64,

    /// Unconditional pause before every request, in milliseconds.
    /// Default: `100` (1000 requests per 100 seconds)
    #[serde(default = "default_per_request_delay")]
    pub per_request_delay_ms: u64,

    /// Upper bound on a single sleep while waiting for the window to elapse.
    /// Default: `5`
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl RateGateConfig {
    pub fn delay_limit(&self) -> Duration {
        Duration::from_secs(self.delay_limit_seconds)
    }

    pub fn per_request_delay(&self) -> Duration {
        Duration::from_millis(self.per_request_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `warn`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            translate_base_url: default_translate_base_url(),
            language_base_url: default_language_base_url(),
            speech_base_url: default_speech_base_url(),
            timeout_seconds: default_timeout(),
            connection_pool_size: default_pool_size(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            credentials_path: default_credentials_path(),
            auto_refresh: true,
            refresh_buffer_seconds: default_refresh_buffer(),
            client_id: String::new(),
            client_secret: String::new(),
            token_url: default_token_url(),
        }
    }
}

impl Default for RateGateConfig {
    fn default() -> Self {
        Self {
            character_limit: default_character_limit(),
            delay_limit_seconds: default_delay_limit(),
            per_request_delay_ms: default_per_request_delay(),
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults
fn default_translate_base_url() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_language_base_url() -> String {
    "https://language.googleapis.com/v1".to_string()
}

fn default_speech_base_url() -> String {
    "https://speech.googleapis.com/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_pool_size() -> usize {
    10
}

fn default_credentials_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".cloudlingo")
        .join("oauth_creds.json")
        .to_string_lossy()
        .to_string()
}

fn default_true() -> bool {
    true
}

fn default_refresh_buffer() -> i64 {
    300 // 5 minutes
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_character_limit() -> u64 {
    100_000
}

fn default_delay_limit() -> u64 {
    100
}

fn default_per_request_delay() -> u64 {
    100
}

fn default_poll_interval() -> u64 {
    5
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}
