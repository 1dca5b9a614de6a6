//! Memory records — the timestamped events the agent accumulates.
//!
//! Every thought the agent has and every action it takes becomes a
//! `MemoryRecord`. Records live first in the session buffer; consolidation
//! may promote a copy into the long-term archive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of event a record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// An ordinary musing (the classifier's default)
    Thought,
    /// Looking back on past work or behavior
    Reflection,
    /// A commitment to a course of action
    Decision,
    /// An open question or fascination
    Curiosity,
    /// Something finished or figured out
    Achievement,
    /// A dispatched action and its outcome
    Action,
}

/// Whether a record still lives only in the current session or has been
/// promoted to the archive. Promotion happens at most once per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordScope {
    #[default]
    Session,
    Archived,
}

/// How a dispatched action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Success,
    Failure,
}

/// A single timestamped event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Time-ordered unique ID (UUIDv7, creation-time-derived)
    pub id: String,

    /// When the record was created
    pub timestamp: DateTime<Utc>,

    /// What kind of event this is
    pub kind: RecordKind,

    /// The text of the thought, or a summary line for actions
    pub content: String,

    /// Name of the dispatched action (only for `kind = Action`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,

    /// How the action ended (only for `kind = Action`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ActionOutcome>,

    /// Handler-reported detail text (only for `kind = Action`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Session vs. archived (flipped by consolidation)
    #[serde(default)]
    pub scope: RecordScope,
}

impl MemoryRecord {
    /// Create a thought-family record (anything except `Action`).
    pub fn thought(content: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            kind,
            content: content.into(),
            action_name: None,
            outcome: None,
            details: None,
            scope: RecordScope::Session,
        }
    }

    /// Create an action record.
    pub fn action(
        name: impl Into<String>,
        outcome: ActionOutcome,
        details: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let details = details.into();
        Self {
            id: Uuid::now_v7().to_string(),
            timestamp: Utc::now(),
            kind: RecordKind::Action,
            content: format!("{name}: {details}"),
            action_name: Some(name),
            outcome: Some(outcome),
            details: Some(details),
            scope: RecordScope::Session,
        }
    }

    /// True for action records that ended in success.
    pub fn is_successful_action(&self) -> bool {
        self.kind == RecordKind::Action && self.outcome == Some(ActionOutcome::Success)
    }
}
