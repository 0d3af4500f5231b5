// Error types for cloudlingo
// Author: kelexine (https://github.com/kelexine)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Google API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("OAuth token refresh failed: {0}")]
    OAuthRefresh(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Rate gate wait cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-readable category, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid_argument",
            Error::Config(_) | Error::ConfigParsing(_) => "configuration_error",
            Error::Api { status: 429, .. } => "quota_exceeded",
            Error::Api { status: 401 | 403, .. } => "authentication_error",
            Error::Api { .. } => "api_error",
            Error::InvalidResponse(_) | Error::Json(_) => "invalid_response",
            Error::InvalidCredentials(_) | Error::OAuthRefresh(_) | Error::TokenExpired => {
                "authentication_error"
            }
            Error::Cancelled => "cancelled",
            Error::Http(_) => "network_error",
            Error::Io(_) | Error::Internal(_) => "internal_error",
        }
    }

    /// HTTP status reported by Google, if this error came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
