//! Structured logging and secret redaction.
//!
//! This module configures the `tracing` ecosystem for the application and
//! provides [`sanitize`] so that Google credentials never reach a log sink.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber for the application.
///
/// Supports three output formats:
/// - `json`: Structured JSON logs for machine ingestion.
/// - `pretty`: Human-readable, multi-line output.
/// - `compact` (default): One line per event, written to stderr so that
///   command output on stdout stays machine readable.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| Error::Internal(format!("Failed to initialize logging: {}", e)))
}

/// Credential prefixes and their replacement markers.
const SECRET_PATTERNS: &[(&str, &str)] = &[
    // Google OAuth2 access tokens
    ("ya29.", "[REDACTED_ACCESS_TOKEN]"),
    // Google refresh tokens
    ("1//0", "[REDACTED_REFRESH_TOKEN]"),
    // Google Cloud API keys
    ("AIza", "[REDACTED_API_KEY]"),
];

/// Replaces every Google access token, refresh token and API key in `input`
/// with a `[REDACTED_*]` marker.
///
/// A secret runs from its prefix up to the next whitespace, quote, `&` or
/// end of string.
pub fn sanitize(input: &str) -> String {
    let mut result = input.to_string();

    for (prefix, marker) in SECRET_PATTERNS {
        let mut search_from = 0;
        while let Some(offset) = result[search_from..].find(prefix) {
            let start = search_from + offset;
            let end = result[start..]
                .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '&')
                .map(|i| start + i)
                .unwrap_or(result.len());
            result.replace_range(start..end, marker);
            search_from = start + marker.len();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_access_token() {
        let input = "Authorization: Bearer ya29.a0AfH6SMC...";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_ACCESS_TOKEN]"));
        assert!(!output.contains("ya29.a0AfH6SMC"));
    }

    #[test]
    fn test_sanitize_refresh_token() {
        let input = "refresh_token: 1//01S6LICZta2ee...";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_REFRESH_TOKEN]"));
        assert!(!output.contains("1//01S6LICZta2ee"));
    }

    #[test]
    fn test_sanitize_api_key_in_query() {
        let input = "GET /v2?key=AIzaSyD-example&target=fr";
        let output = sanitize(input);
        assert_eq!(output, "GET /v2?key=[REDACTED_API_KEY]&target=fr");
    }

    #[test]
    fn test_sanitize_every_occurrence() {
        let input = "\"ya29.first\" and \"ya29.second\"";
        let output = sanitize(input);
        assert_eq!(
            output,
            "\"[REDACTED_ACCESS_TOKEN]\" and \"[REDACTED_ACCESS_TOKEN]\""
        );
    }

    #[test]
    fn test_sanitize_leaves_plain_text() {
        assert_eq!(sanitize("bonjour le monde"), "bonjour le monde");
    }
}
