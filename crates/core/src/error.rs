//! Error types for the Driftmind domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Driftmind operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Oracle errors ---
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    // --- Posting transport errors ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Sandbox errors ---
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the decision oracle. Never fatal to the loop: a failed
/// request costs one cycle (or one action round) and the loop retries after
/// its sleep.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Oracle returned an empty response")]
    EmptyResponse,

    #[error("Oracle not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures in the external posting transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Transport not configured: {0}")]
    NotConfigured(String),

    #[error("Post rejected: {message} (status: {status_code})")]
    Rejected { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures inside the memory store. Persistence failures degrade to
/// best-effort in-memory state; they never stop the loop.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("A project named '{name}' already exists")]
    DuplicateProject { name: String },
}

/// Policy violations and execution failures inside the sandbox.
///
/// `Containment` is the security invariant of the component: a request whose
/// resolved path would land outside the sandbox root. Containment violations
/// are rejected, never retried.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Path '{path}' escapes the sandbox root")]
    Containment { path: String },

    #[error("Extension '{extension}' is not on the allow-list")]
    Extension { extension: String },

    #[error("Content is {size} bytes, over the {limit}-byte ceiling")]
    TooLarge { size: usize, limit: usize },

    #[error("Command '{command}' not in allowlist")]
    CommandNotAllowed { command: String },

    #[error("Command timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Command output exceeded {limit} bytes")]
    OutputOverflow { limit: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SandboxError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            SandboxError::NotFound(e.to_string())
        } else {
            SandboxError::Io(e.to_string())
        }
    }
}
