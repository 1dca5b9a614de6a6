//! # Driftmind Core
//!
//! Domain types, traits, and error definitions for the Driftmind autonomous
//! agent runtime. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (the decision oracle, the posting transport)
//! is defined as a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod action;
pub mod error;
pub mod oracle;
pub mod project;
pub mod record;
pub mod transport;

// Re-export key types at crate root for ergonomics
pub use action::{ActionDirective, AgentAction};
pub use error::{Error, MemoryError, OracleError, Result, SandboxError, TransportError};
pub use oracle::{Oracle, OracleRequest};
pub use project::{Project, ProjectPatch, ProjectStatus};
pub use record::{ActionOutcome, MemoryRecord, RecordKind, RecordScope};
pub use transport::{PostReceipt, PostTransport};
