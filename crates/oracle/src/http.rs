//! OpenAI-compatible chat-completions oracle.
//!
//! Builds a system + user message pair from the request: the persona goes in
//! the system message, the memory-derived context lines are prepended to the
//! prompt in the user message. The response is the first choice's content.

use async_trait::async_trait;
use driftmind_core::{Oracle, OracleError, OracleRequest};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat-completions client.
pub struct HttpOracle {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpOracle {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Point at a different OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Assemble the user message: context lines first, then the prompt.
    fn user_content(request: &OracleRequest) -> String {
        if request.context.is_empty() {
            return request.prompt.clone();
        }

        let mut content = String::from("Recent context:\n");
        for line in &request.context {
            content.push_str("- ");
            content.push_str(line);
            content.push('\n');
        }
        content.push('\n');
        content.push_str(&request.prompt);
        content
    }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl Oracle for HttpOracle {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: OracleRequest) -> Result<String, OracleError> {
        if self.api_key.is_empty() {
            return Err(OracleError::NotConfigured("oracle API key is empty".into()));
        }

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: Self::user_content(&request),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, "Oracle request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(e.to_string())
                } else {
                    OracleError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(content)
    }
}
