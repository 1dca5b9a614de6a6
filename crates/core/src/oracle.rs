//! Oracle trait — the abstraction over the generative decision model.
//!
//! The loop treats the oracle as an external collaborator: it sends a persona
//! plus a small amount of memory-derived context and gets free text back.
//! What the text *means* (a thought, or an action directive) is decided by
//! the caller, not the oracle.

use async_trait::async_trait;
use crate::error::OracleError;

/// A single request to the decision oracle.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// The agent's persona (system text)
    pub system: String,

    /// Up to the last 5 memory-derived context lines, oldest first
    pub context: Vec<String>,

    /// The user/context text for this request
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Token ceiling for the response
    pub max_tokens: u32,
}

impl OracleRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            context: Vec::new(),
            prompt: prompt.into(),
            temperature: 0.9,
            max_tokens: 600,
        }
    }

    /// Attach memory-derived context lines (callers pass at most 5).
    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// The decision oracle. Implementations: HTTP chat-completions client,
/// scripted responses for tests.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// A human-readable name for this oracle (e.g., "openai", "scripted").
    fn name(&self) -> &str;

    /// Send a request and get the response text back.
    async fn complete(&self, request: OracleRequest) -> Result<String, OracleError>;
}
