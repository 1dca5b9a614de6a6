//! Posting transports.
//!
//! `HttpPostTransport` delivers text to a remote posting service with an
//! injected session token (the authentication flow that produced the token
//! lives outside this codebase). `NullTransport` is the stand-in wired up
//! when posting is not configured.

use async_trait::async_trait;
use driftmind_core::{PostReceipt, PostTransport, TransportError};
use tracing::debug;

/// HTTP posting transport with bearer-token auth.
pub struct HttpPostTransport {
    base_url: String,
    session_token: String,
    client: reqwest::Client,
}

impl HttpPostTransport {
    pub fn new(base_url: impl Into<String>, session_token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: session_token.into(),
            client,
        }
    }
}

#[async_trait]
impl PostTransport for HttpPostTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn post(&self, text: &str) -> Result<PostReceipt, TransportError> {
        if self.session_token.is_empty() {
            return Err(TransportError::NotConfigured(
                "posting session token is empty".into(),
            ));
        }

        let url = format!("{}/posts", self.base_url);
        debug!(url = %url, chars = text.chars().count(), "Posting");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.session_token)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status_code: status.as_u16(),
                message: body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(PostReceipt {
            id: body
                .get("id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}

/// Transport used when no posting service is configured. Every call fails
/// with `NotConfigured`; the gate is expected to be disabled alongside it.
pub struct NullTransport;

#[async_trait]
impl PostTransport for NullTransport {
    fn name(&self) -> &str {
        "null"
    }

    async fn post(&self, _text: &str) -> Result<PostReceipt, TransportError> {
        Err(TransportError::NotConfigured(
            "no posting transport configured".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpPostTransport::new("https://posts.example.com/", "tok");
        assert_eq!(transport.base_url, "https://posts.example.com");
        assert_eq!(transport.name(), "http");
    }

    #[tokio::test]
    async fn empty_token_is_not_configured() {
        let transport = HttpPostTransport::new("https://posts.example.com", "");
        let result = transport.post("hello").await;
        assert!(matches!(result, Err(TransportError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn null_transport_always_fails() {
        let result = NullTransport.post("hello").await;
        assert!(matches!(result, Err(TransportError::NotConfigured(_))));
    }
}
