//! Projects — units of longer-running creative work.
//!
//! A project collects notes and sandbox files over many cycles. Projects are
//! never deleted: they transition `Active -> Completed/Archived` via cleanup
//! or explicit completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

/// A unit of longer-running creative work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,

    /// Unique among active projects (case-insensitive)
    pub name: String,

    pub description: String,

    pub status: ProjectStatus,

    pub created: DateTime<Utc>,

    /// Refreshed on every related action
    pub last_worked: DateTime<Utc>,

    /// Ordered work log
    #[serde(default)]
    pub notes: Vec<String>,

    /// Sandbox-relative paths touched by this project (deduplicated)
    #[serde(default)]
    pub files: Vec<String>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        status: ProjectStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            status,
            created: now,
            last_worked: now,
            notes: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    /// Append a work note and refresh `last_worked`.
    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
        self.last_worked = Utc::now();
    }

    /// Track a sandbox file as belonging to this project (no duplicates).
    pub fn add_file(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.files.contains(&path) {
            self.files.push(path);
        }
        self.last_worked = Utc::now();
    }

    /// Case-insensitive name comparison, used for duplicate detection.
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other.trim())
    }
}

/// A partial update merged into an existing project. Fields that are `Some`
/// replace (or append to) the current values; `last_worked` is always
/// refreshed when a patch is applied.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub note: Option<String>,
    pub file: Option<String>,
}

impl ProjectPatch {
    pub fn status(status: ProjectStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }
}
