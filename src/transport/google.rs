// reqwest-backed transport with Google credential handling
// Author: kelexine (https://github.com/kelexine)

use super::{Method, Transport};
use crate::auth::Credentials;
use crate::config::{AuthConfig, GoogleConfig};
use crate::error::{Error, Result};
use crate::utils::logging::sanitize;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Sends requests to Google with either an API key or an OAuth2 bearer token.
#[derive(Debug, Clone)]
pub struct GoogleTransport {
    http_client: Client,
    credentials: Credentials,
}

impl GoogleTransport {
    /// Builds the HTTP client and resolves credentials from config.
    pub fn new(config: &GoogleConfig, auth: &AuthConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(config.connection_pool_size)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let credentials = Credentials::from_config(auth, http_client.clone())?;
        Ok(Self::with_credentials(http_client, credentials))
    }

    pub fn with_credentials(http_client: Client, credentials: Credentials) -> Self {
        Self {
            http_client,
            credentials,
        }
    }

    /// Pull `error.message` (or `error.status`) out of a Google error envelope.
    fn extract_error_message(response_text: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(serde::Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
            status: Option<String>,
        }

        let error = serde_json::from_str::<ErrorResponse>(response_text)
            .ok()?
            .error?;
        error.message.or(error.status)
    }

    /// Metrics label: the first host label, e.g. `translation` for
    /// `translation.googleapis.com`.
    fn service_label(url: &str) -> &str {
        url.split("://")
            .nth(1)
            .and_then(|rest| rest.split(['.', '/', ':']).next())
            .filter(|label| !label.is_empty())
            .unwrap_or("unknown")
    }
}

#[async_trait]
impl Transport for GoogleTransport {
    async fn call(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        debug!("{} {}", method, url);

        let mut request = match method {
            Method::Get => self.http_client.get(url),
            Method::Post => self.http_client.post(url),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let request = self.credentials.authorize(request).await?;

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;
        crate::metrics::record_api_call(
            Self::service_label(url),
            status.as_u16(),
            started.elapsed().as_secs_f64(),
        );

        if !status.is_success() {
            let message = Self::extract_error_message(&response_text)
                .unwrap_or_else(|| response_text.clone());
            let message = sanitize(&message);
            error!("Google API error: HTTP {} - {}", status, message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(
            "Raw response (first 500 chars): {}",
            sanitize(&response_text.chars().take(500).collect::<String>())
        );

        if response_text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&response_text)
            .map_err(|e| Error::InvalidResponse(format!("Response parsing error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ApiKey;
    use mockito::Matcher;
    use serde_json::json;

    fn transport() -> GoogleTransport {
        GoogleTransport::with_credentials(
            Client::new(),
            Credentials::ApiKey(ApiKey::new("AIzaTestKey")),
        )
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error":{"code":403,"message":"API key not valid.","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            GoogleTransport::extract_error_message(body).as_deref(),
            Some("API key not valid.")
        );
        let body = r#"{"error":{"code":429,"status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            GoogleTransport::extract_error_message(body).as_deref(),
            Some("RESOURCE_EXHAUSTED")
        );
        assert!(GoogleTransport::extract_error_message("<html>").is_none());
    }

    #[test]
    fn test_service_label() {
        assert_eq!(
            GoogleTransport::service_label("https://translation.googleapis.com/language/translate/v2"),
            "translation"
        );
        assert_eq!(
            GoogleTransport::service_label("https://speech.googleapis.com/v1/speech:recognize"),
            "speech"
        );
        assert_eq!(GoogleTransport::service_label("not a url"), "unknown");
    }

    #[tokio::test]
    async fn test_post_sends_key_query_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "AIzaTestKey".into()),
                Matcher::UrlEncoded("alt".into(), "json".into()),
            ]))
            .match_body(Matcher::Json(json!({"q": ["hello"]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"ok":true}}"#)
            .create_async()
            .await;

        let value = transport()
            .call(
                Method::Post,
                &format!("{}/v2", server.url()),
                &[("alt".to_string(), "json".to_string())],
                Some(json!({"q": ["hello"]})),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["data"]["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_surfaces_google_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/languages")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error":{"code":429,"message":"User Rate Limit Exceeded"}}"#)
            .create_async()
            .await;

        let err = transport()
            .call(Method::Get, &format!("{}/v2/languages", server.url()), &[], None)
            .await
            .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "User Rate Limit Exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = transport()
            .call(Method::Get, &format!("{}/v1", server.url()), &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
