//! The Driftmind control loop.
//!
//! Each cycle: snapshot memory → ask the oracle for a thought → classify it
//! → up to a bounded number of action rounds (plan, dispatch, record) →
//! maybe consolidate → persist → sleep. A cycle's failure is reported and
//! absorbed; only the external shutdown signal ends the loop.

mod classify;
mod loop_runner;

pub use classify::classify_thought;
pub use loop_runner::{AgentLoop, CycleReport};
