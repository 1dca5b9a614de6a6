//! Posting transport trait — the external side effect behind the rate gate.
//!
//! One call posts formatted text and returns a receipt or an error. Session
//! material (tokens, handles) is injected into the implementation; the
//! authentication flow itself lives outside this codebase.

use async_trait::async_trait;
use crate::error::TransportError;

/// What the transport hands back on a successful post.
#[derive(Debug, Clone, Default)]
pub struct PostReceipt {
    /// Remote identifier of the created post, when the service returns one
    pub id: Option<String>,
}

/// The external posting service.
#[async_trait]
pub trait PostTransport: Send + Sync {
    /// A human-readable name for this transport (e.g., "http", "null").
    fn name(&self) -> &str;

    /// Post already-formatted text. The text is assumed to fit the service's
    /// length limit; formatting is the rate gate's job.
    async fn post(&self, text: &str) -> Result<PostReceipt, TransportError>;
}
