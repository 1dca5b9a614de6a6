//! The memory store — session buffer, archive, experience log, projects.
//!
//! A single store instance is constructed explicitly and passed by reference
//! to the loop and to each action handler; there are no ambient singletons.
//! The loop runs strictly sequentially, so no interior locking is needed.

use crate::persist::{read_json_or_default, write_json_atomic};
use chrono::Utc;
use driftmind_core::{
    ActionOutcome, MemoryError, MemoryRecord, Project, ProjectPatch, ProjectStatus, RecordKind,
    RecordScope,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn};

// Buffer caps: when a buffer grows past its high-water mark it is trimmed
// down to the most recent low-water records in one pass.
const SESSION_HIGH_WATER: usize = 50;
const SESSION_LOW_WATER: usize = 30;
const EXPERIENCE_HIGH_WATER: usize = 200;
const EXPERIENCE_LOW_WATER: usize = 150;
const ARCHIVE_HIGH_WATER: usize = 100;
const ARCHIVE_LOW_WATER: usize = 80;

/// How many projects may stay active after a cleanup pass.
const ACTIVE_PROJECT_CAP: usize = 2;

const ARCHIVE_FILE: &str = "archive.json";
const EXPERIENCE_FILE: &str = "experience.json";
const PROJECTS_FILE: &str = "projects.json";

/// A read-only snapshot used to build the next decision request.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    /// Last 5 session records of kind `Thought`, oldest first
    pub recent_thoughts: Vec<MemoryRecord>,

    /// All currently active projects
    pub active_projects: Vec<Project>,

    /// Last 3 experience-log entries, oldest first
    pub recent_actions: Vec<MemoryRecord>,

    /// Current session buffer length
    pub session_length: usize,
}

/// The agent's memory.
///
/// The session buffer is deliberately ephemeral: it is never persisted and a
/// restart begins with an empty one. Archive, experience log, and project
/// registry round-trip to three independent JSON resources under `root`.
pub struct MemoryStore {
    root: Option<PathBuf>,
    session: Vec<MemoryRecord>,
    archive: Vec<MemoryRecord>,
    experience: Vec<MemoryRecord>,
    projects: Vec<Project>,
}

impl MemoryStore {
    /// Open a store rooted at `root`, loading whatever durable state exists.
    ///
    /// I/O and decode failures degrade to empty collections with a warning;
    /// opening never fails.
    pub fn open(root: PathBuf) -> Self {
        let archive: Vec<MemoryRecord> = read_json_or_default(&root.join(ARCHIVE_FILE));
        let experience: Vec<MemoryRecord> = read_json_or_default(&root.join(EXPERIENCE_FILE));
        let projects: Vec<Project> = read_json_or_default(&root.join(PROJECTS_FILE));

        debug!(
            root = %root.display(),
            archive = archive.len(),
            experience = experience.len(),
            projects = projects.len(),
            "Memory store loaded"
        );

        Self {
            root: Some(root),
            session: Vec::new(),
            archive,
            experience,
            projects,
        }
    }

    /// An unrooted store that never touches disk. Used by tests and
    /// observe-only runs; `persist` becomes a no-op.
    pub fn ephemeral() -> Self {
        Self {
            root: None,
            session: Vec::new(),
            archive: Vec::new(),
            experience: Vec::new(),
            projects: Vec::new(),
        }
    }

    // ── Records ─────────────────────────────────────────────────────────

    /// Append a thought-family record to the session buffer.
    pub fn add_thought(&mut self, content: impl Into<String>, kind: RecordKind) -> MemoryRecord {
        let record = MemoryRecord::thought(content, kind);
        self.session.push(record.clone());
        trim_oldest(&mut self.session, SESSION_HIGH_WATER, SESSION_LOW_WATER);
        record
    }

    /// Append an action record to the session buffer and the experience log.
    pub fn add_action(
        &mut self,
        name: impl Into<String>,
        outcome: ActionOutcome,
        details: impl Into<String>,
    ) -> MemoryRecord {
        let record = MemoryRecord::action(name, outcome, details);
        self.session.push(record.clone());
        trim_oldest(&mut self.session, SESSION_HIGH_WATER, SESSION_LOW_WATER);
        self.experience.push(record.clone());
        trim_oldest(&mut self.experience, EXPERIENCE_HIGH_WATER, EXPERIENCE_LOW_WATER);
        record
    }

    /// Promote qualifying session records into the archive.
    ///
    /// Qualifying: kind `Reflection` or `Achievement`, or an action that
    /// ended in success. Each record is promoted at most once (its scope
    /// flips to `Archived`); promoted records stay in the session buffer
    /// until its own cap trims them. Returns how many records moved.
    pub fn consolidate(&mut self) -> usize {
        let mut moved = 0;
        for record in self.session.iter_mut() {
            if record.scope == RecordScope::Archived {
                continue;
            }
            let qualifies = matches!(record.kind, RecordKind::Reflection | RecordKind::Achievement)
                || record.is_successful_action();
            if !qualifies {
                continue;
            }

            record.scope = RecordScope::Archived;
            self.archive.push(record.clone());
            moved += 1;
        }

        trim_oldest(&mut self.archive, ARCHIVE_HIGH_WATER, ARCHIVE_LOW_WATER);

        if moved > 0 {
            debug!(moved, archive = self.archive.len(), "Consolidated session records");
        }
        moved
    }

    // ── Projects ────────────────────────────────────────────────────────

    /// Register a new project. The name must not collide (case-insensitive)
    /// with an existing active project.
    pub fn add_project(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        status: ProjectStatus,
    ) -> Result<Project, MemoryError> {
        let name = name.into();
        if self.projects.iter().any(|p| p.is_active() && p.name_matches(&name)) {
            return Err(MemoryError::DuplicateProject { name });
        }

        let project = Project::new(name, description, status);
        self.projects.push(project.clone());
        Ok(project)
    }

    /// Merge a partial update into the project with the given id.
    ///
    /// Fields present in the patch replace (or append to) existing ones;
    /// `last_worked` is always refreshed. Returns `Ok(None)` when no project
    /// has that id, and rejects a rename that collides with another active
    /// project's name.
    pub fn update_project(
        &mut self,
        id: &str,
        patch: ProjectPatch,
    ) -> Result<Option<Project>, MemoryError> {
        if let Some(new_name) = &patch.name {
            let collides = self
                .projects
                .iter()
                .any(|p| p.id != id && p.is_active() && p.name_matches(new_name));
            if collides {
                return Err(MemoryError::DuplicateProject {
                    name: new_name.clone(),
                });
            }
        }

        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(note) = patch.note {
            project.notes.push(note);
        }
        if let Some(file) = patch.file
            && !project.files.contains(&file)
        {
            project.files.push(file);
        }
        project.last_worked = Utc::now();

        Ok(Some(project.clone()))
    }

    /// Find an active project by name (case-insensitive).
    pub fn find_active_project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.is_active() && p.name_matches(name))
    }

    /// Demote active projects beyond the cap.
    ///
    /// The most recently created `ACTIVE_PROJECT_CAP` projects stay active;
    /// any older active ones flip to `Completed`. Returns how many changed.
    pub fn cleanup_projects(&mut self) -> usize {
        let mut active: Vec<(usize, chrono::DateTime<Utc>)> = self
            .projects
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active())
            .map(|(i, p)| (i, p.created))
            .collect();
        active.sort_by(|a, b| b.1.cmp(&a.1)); // newest first

        let mut changed = 0;
        for (idx, _) in active.into_iter().skip(ACTIVE_PROJECT_CAP) {
            self.projects[idx].status = ProjectStatus::Completed;
            changed += 1;
        }

        if changed > 0 {
            debug!(changed, "Demoted stale active projects");
        }
        changed
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    // ── Context ─────────────────────────────────────────────────────────

    /// Snapshot the state the next decision request is built from.
    pub fn get_context(&self) -> ContextSnapshot {
        let recent_thoughts: Vec<MemoryRecord> = last_n(
            self.session.iter().filter(|r| r.kind == RecordKind::Thought),
            5,
        );
        let recent_actions: Vec<MemoryRecord> = last_n(self.experience.iter(), 3);

        ContextSnapshot {
            recent_thoughts,
            active_projects: self.projects.iter().filter(|p| p.is_active()).cloned().collect(),
            recent_actions,
            session_length: self.session.len(),
        }
    }

    pub fn session_len(&self) -> usize {
        self.session.len()
    }

    /// The live session buffer, oldest first.
    pub fn session_records(&self) -> &[MemoryRecord] {
        &self.session
    }

    pub fn archive_len(&self) -> usize {
        self.archive.len()
    }

    pub fn experience_len(&self) -> usize {
        self.experience.len()
    }

    // ── Durability ──────────────────────────────────────────────────────

    /// Write archive, experience log, and project registry to their
    /// resources. The session buffer is deliberately not persisted.
    pub fn persist(&self) -> Result<(), MemoryError> {
        let Some(root) = &self.root else {
            return Ok(());
        };

        write_json_atomic(&root.join(ARCHIVE_FILE), &self.archive)?;
        write_json_atomic(&root.join(EXPERIENCE_FILE), &self.experience)?;
        write_json_atomic(&root.join(PROJECTS_FILE), &self.projects)?;
        Ok(())
    }

    /// Dump all durable collections into a timestamped diagnostic snapshot.
    /// Returns the path written.
    pub fn write_snapshot(&self) -> Result<Option<PathBuf>, MemoryError> {
        let Some(root) = &self.root else {
            return Ok(None);
        };

        #[derive(Serialize)]
        struct Snapshot<'a> {
            taken_at: chrono::DateTime<Utc>,
            archive: &'a [MemoryRecord],
            experience: &'a [MemoryRecord],
            projects: &'a [Project],
        }

        let taken_at = Utc::now();
        let path = root
            .join("snapshots")
            .join(format!("snapshot-{}.json", taken_at.format("%Y%m%dT%H%M%SZ")));
        write_json_atomic(
            &path,
            &Snapshot {
                taken_at,
                archive: &self.archive,
                experience: &self.experience,
                projects: &self.projects,
            },
        )?;
        Ok(Some(path))
    }
}

/// Drop the oldest entries once `buf` grows past `high`, keeping the most
/// recent `low`. Appended order is creation order, so draining the front
/// never discards a record newer than one it keeps.
fn trim_oldest(buf: &mut Vec<MemoryRecord>, high: usize, low: usize) {
    if buf.len() > high {
        let excess = buf.len() - low;
        buf.drain(0..excess);
    }
}

fn last_n<'a, I>(iter: I, n: usize) -> Vec<MemoryRecord>
where
    I: DoubleEndedIterator<Item = &'a MemoryRecord>,
{
    let mut out: Vec<MemoryRecord> = iter.rev().take(n).cloned().collect();
    out.reverse();
    out
}
