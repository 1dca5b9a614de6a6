//! Scripted oracle — deterministic canned responses.
//!
//! Responses are handed out in order; once the script runs dry every further
//! request gets a bare `ACTION: wait`, which keeps loop tests from hanging
//! on an exhausted script.

use async_trait::async_trait;
use driftmind_core::{Oracle, OracleError, OracleRequest};
use std::collections::VecDeque;
use std::sync::Mutex;

/// An oracle that replays a fixed script.
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<String>>,
    requests_seen: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests_seen: Mutex::new(Vec::new()),
        }
    }

    /// How many requests have been served so far.
    pub fn requests_served(&self) -> usize {
        self.requests_seen.lock().unwrap().len()
    }

    /// Prompts of all requests seen, in order.
    pub fn prompts_seen(&self) -> Vec<String> {
        self.requests_seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: OracleRequest) -> Result<String, OracleError> {
        self.requests_seen.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| "ACTION: wait".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_waits() {
        let oracle = ScriptedOracle::new(["first", "second"]);

        let req = || OracleRequest::new("persona", "prompt");
        assert_eq!(oracle.complete(req()).await.unwrap(), "first");
        assert_eq!(oracle.complete(req()).await.unwrap(), "second");
        assert_eq!(oracle.complete(req()).await.unwrap(), "ACTION: wait");
        assert_eq!(oracle.requests_served(), 3);
    }
}
