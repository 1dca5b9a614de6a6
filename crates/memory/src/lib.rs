//! Memory system for Driftmind.
//!
//! Two tiers: a short-lived session buffer (never persisted) and a long-term
//! archive, plus an experience log of past actions and the project registry.
//! Consolidation promotes selected session records into the archive;
//! everything durable round-trips through three independent JSON resources.

mod persist;
mod store;

pub use store::{ContextSnapshot, MemoryStore};
