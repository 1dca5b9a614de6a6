//! Decision-oracle clients.
//!
//! `HttpOracle` talks to an OpenAI-compatible chat-completions endpoint;
//! `ScriptedOracle` replays canned responses for deterministic tests.

mod http;
mod scripted;

pub use http::HttpOracle;
pub use scripted::ScriptedOracle;
