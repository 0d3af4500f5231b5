// Credential sources for the Google transport
// Author: kelexine (https://github.com/kelexine)

mod oauth;

pub use oauth::OAuthManager;

use crate::config::AuthConfig;
use crate::error::Result;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// OAuth2 user credentials as written by `gcloud auth application-default login`
/// plus the cached access token.
#[derive(Clone, Deserialize, Serialize, Zeroize)]
#[zeroize(drop)]
pub struct OAuthCredentials {
    #[serde(default)]
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiry as Unix milliseconds. Zero forces a refresh on first use.
    #[serde(default)]
    pub expiry_date: i64,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

// Custom Debug impl that never logs tokens
impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expiry_date", &self.expiry_date)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl OAuthCredentials {
    /// Check if token is missing, expired or will expire within buffer seconds
    pub fn is_expired(&self, buffer_seconds: i64) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        self.access_token.is_empty() || self.expiry_date - now < buffer_seconds * 1000
    }

    /// Get remaining time until expiry in seconds
    pub fn expires_in_seconds(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        (self.expiry_date - now) / 1000
    }
}

/// Google API key. Zeroed on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// How requests are authenticated.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// `key=<api key>` query parameter.
    ApiKey(ApiKey),
    /// `Authorization: Bearer <access token>` header.
    OAuth(OAuthManager),
}

impl Credentials {
    /// API key when configured, otherwise the OAuth2 credentials file.
    pub fn from_config(config: &AuthConfig, http: Client) -> Result<Self> {
        match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Ok(Credentials::ApiKey(ApiKey::new(key))),
            None => Ok(Credentials::OAuth(OAuthManager::new(config, http)?)),
        }
    }

    /// Attach credentials to an outgoing request.
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self {
            Credentials::ApiKey(key) => Ok(request.query(&[("key", key.as_str())])),
            Credentials::OAuth(manager) => {
                let token = manager.get_token().await?;
                Ok(request.bearer_auth(token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(expiry_date: i64) -> OAuthCredentials {
        OAuthCredentials {
            access_token: "ya29.secret".to_string(),
            refresh_token: "1//01refresh".to_string(),
            token_type: "Bearer".to_string(),
            expiry_date,
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: "GOCSPX-secret".to_string(),
        }
    }

    #[test]
    fn test_debug_impl_masks_tokens() {
        let debug_str = format!("{:?}", credentials(1768126811935));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("ya29"));
        assert!(!debug_str.contains("1//01"));
        assert!(!debug_str.contains("GOCSPX"));
    }

    #[test]
    fn test_expiry_detection() {
        let future_expiry = chrono::Utc::now().timestamp_millis() + 3600000; // 1 hour from now
        let creds = credentials(future_expiry);

        assert!(!creds.is_expired(0));
        assert!(creds.is_expired(3700)); // More than 1 hour buffer
        assert!(creds.expires_in_seconds() > 3500);
    }

    #[test]
    fn test_missing_access_token_counts_as_expired() {
        let mut creds = credentials(chrono::Utc::now().timestamp_millis() + 3600000);
        creds.access_token.clear();
        assert!(creds.is_expired(0));
    }

    #[test]
    fn test_api_key_takes_precedence() {
        let config = AuthConfig {
            api_key: Some("AIzaTest".to_string()),
            credentials_path: "/nonexistent/path".to_string(),
            ..Default::default()
        };
        let creds = Credentials::from_config(&config, Client::new()).unwrap();
        assert!(matches!(creds, Credentials::ApiKey(_)));
        assert!(!format!("{:?}", creds).contains("AIzaTest"));
    }
}
