//! Google OAuth2 token management.
//!
//! `OAuthManager` owns the lifecycle of a Google access token: it loads user
//! credentials from disk, refuses files readable by other users, and refreshes
//! the token with a refresh-token grant when it is about to expire. Refreshes
//! use double-checked locking so that concurrent callers trigger at most one
//! round trip to the token endpoint.

// Author: kelexine (https://github.com/kelexine)

use super::OAuthCredentials;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Manages Google OAuth2 credentials and provides valid access tokens.
#[derive(Clone)]
pub struct OAuthManager {
    /// In-memory cache of the current OAuth2 credentials.
    credentials: Arc<RwLock<OAuthCredentials>>,
    /// Serializes refresh attempts.
    refresh_lock: Arc<Mutex<()>>,
    http: Client,
    config: AuthConfig,
}

impl std::fmt::Debug for OAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthManager")
            .field("credentials_path", &self.config.credentials_path)
            .finish_non_exhaustive()
    }
}

impl OAuthManager {
    /// Loads credentials from `config.credentials_path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCredentials` if the file is missing, malformed,
    /// or has insecure permissions.
    pub fn new(config: &AuthConfig, http: Client) -> Result<Self> {
        let credentials = Self::load_credentials(&config.credentials_path)?;

        debug!("Loaded OAuth credentials from {}", config.credentials_path);

        Ok(Self {
            credentials: Arc::new(RwLock::new(credentials)),
            refresh_lock: Arc::new(Mutex::new(())),
            http,
            config: config.clone(),
        })
    }

    fn load_credentials(path: &str) -> Result<OAuthCredentials> {
        let path = Path::new(path);

        if !path.exists() {
            return Err(Error::InvalidCredentials(format!(
                "Credentials file not found: {}",
                path.display()
            )));
        }

        Self::validate_permissions(path)?;

        let contents = fs::read_to_string(path).map_err(|e| {
            Error::InvalidCredentials(format!("Failed to read credentials: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            Error::InvalidCredentials(format!("Invalid credentials JSON format: {}", e))
        })
    }

    /// Credentials file must be owner-only (0600 or 0400).
    fn validate_permissions(path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            let mode = fs::metadata(path)?.permissions().mode() & 0o777;

            if mode != 0o600 && mode != 0o400 {
                warn!(
                    "Insecure permissions on {}: {:o} (expected 0600)",
                    path.display(),
                    mode
                );
                return Err(Error::InvalidCredentials(format!(
                    "Insecure file permissions: {:o}. Credentials must be 0600 (rw-------).",
                    mode
                )));
            }
        }

        Ok(())
    }

    /// Returns a valid access token, refreshing it first if necessary.
    pub async fn get_token(&self) -> Result<String> {
        {
            let creds = self.credentials.read().await;
            if !creds.is_expired(self.config.refresh_buffer_seconds) {
                return Ok(creds.access_token.clone());
            }
        }

        if !self.config.auto_refresh {
            return Err(Error::TokenExpired);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        {
            let creds = self.credentials.read().await;
            if !creds.is_expired(self.config.refresh_buffer_seconds) {
                debug!("Token already refreshed by another caller");
                return Ok(creds.access_token.clone());
            }
        }

        let (expires_in, _) = self.token_info().await;
        warn!(expires_in, "OAuth access token expired; refreshing");
        match self.refresh_token().await {
            Ok(new_creds) => {
                let token = new_creds.access_token.clone();
                if let Err(e) = self.save_credentials(&new_creds) {
                    error!("Failed to persist refreshed token: {}", e);
                }
                *self.credentials.write().await = new_creds;

                info!("OAuth access token refreshed");
                crate::metrics::record_oauth_refresh(true);
                Ok(token)
            }
            Err(e) => {
                crate::metrics::record_oauth_refresh(false);
                Err(e)
            }
        }
    }

    /// Exchanges the refresh token for a new access token.
    async fn refresh_token(&self) -> Result<OAuthCredentials> {
        let creds = self.credentials.read().await.clone();

        let client_id = if creds.client_id.is_empty() {
            self.config.client_id.as_str()
        } else {
            creds.client_id.as_str()
        };
        let client_secret = if creds.client_secret.is_empty() {
            self.config.client_secret.as_str()
        } else {
            creds.client_secret.as_str()
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", creds.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::OAuthRefresh(format!("Token endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(Error::OAuthRefresh(format!(
                "HTTP {}: {}",
                status.as_u16(),
                crate::utils::logging::sanitize(&error_text)
            )));
        }

        let token_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::OAuthRefresh(format!("Malformed JSON response: {}", e)))?;

        let access_token = token_data
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::OAuthRefresh("Missing access_token in Google response".to_string())
            })?
            .to_string();

        let expires_in = token_data
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);

        debug!("Refreshed token expires in {} seconds", expires_in);

        Ok(OAuthCredentials {
            access_token,
            refresh_token: creds.refresh_token.clone(),
            token_type: "Bearer".to_string(),
            expiry_date: chrono::Utc::now().timestamp_millis() + expires_in * 1000,
            client_id: creds.client_id.clone(),
            client_secret: creds.client_secret.clone(),
        })
    }

    fn save_credentials(&self, creds: &OAuthCredentials) -> Result<()> {
        let path = Path::new(&self.config.credentials_path);
        let json = serde_json::to_string_pretty(creds)?;

        fs::write(path, json)?;

        #[cfg(unix)]
        {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Seconds until expiry and whether the token is inside the refresh buffer.
    pub async fn token_info(&self) -> (i64, bool) {
        let creds = self.credentials.read().await;
        (
            creds.expires_in_seconds(),
            creds.is_expired(self.config.refresh_buffer_seconds),
        )
    }
}
