//! The action vocabulary and the oracle directive parser.
//!
//! The oracle replies to a plan request in plain text; we scan it line by
//! line for `ACTION:` / `REASON:` / `DETAILS:` prefixes. The parsed action
//! string then maps into the closed [`AgentAction`] vocabulary — an unknown
//! name is a recoverable decode failure, never a crash.

use serde::{Deserialize, Serialize};

/// The closed set of actions the agent can take. Dispatch is an exhaustive
/// match over this enum; payload data rides in the directive's `details`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentAction {
    /// Do nothing this round (ends the action phase of the cycle)
    Wait,
    /// Create a new file in the sandbox
    CreateFile,
    /// Read a sandbox file back
    ReadFile,
    /// Overwrite an existing sandbox file
    UpdateFile,
    /// List a sandbox directory
    ListFiles,
    /// Run an allowlisted read-only command inside the sandbox
    RunCommand,
    /// Begin a new creative project
    StartProject,
    /// Log progress on an active project
    WorkOnProject,
    /// Mark an active project as completed
    CompleteProject,
    /// Offer a thought to the posting gate
    Share,
}

impl AgentAction {
    pub const ALL: [AgentAction; 10] = [
        AgentAction::Wait,
        AgentAction::CreateFile,
        AgentAction::ReadFile,
        AgentAction::UpdateFile,
        AgentAction::ListFiles,
        AgentAction::RunCommand,
        AgentAction::StartProject,
        AgentAction::WorkOnProject,
        AgentAction::CompleteProject,
        AgentAction::Share,
    ];

    /// The wire name the oracle uses for this action.
    pub fn name(&self) -> &'static str {
        match self {
            AgentAction::Wait => "wait",
            AgentAction::CreateFile => "create_file",
            AgentAction::ReadFile => "read_file",
            AgentAction::UpdateFile => "update_file",
            AgentAction::ListFiles => "list_files",
            AgentAction::RunCommand => "run_command",
            AgentAction::StartProject => "start_project",
            AgentAction::WorkOnProject => "work_on_project",
            AgentAction::CompleteProject => "complete_project",
            AgentAction::Share => "share",
        }
    }

    /// Map a wire name back into the vocabulary. `None` means the oracle
    /// produced a name we do not recognize.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase();
        Self::ALL.iter().copied().find(|a| a.name() == normalized)
    }

    /// One line per action, used when prompting the oracle for a plan.
    pub fn vocabulary_lines() -> String {
        let mut out = String::new();
        for action in Self::ALL {
            let hint = match action {
                AgentAction::Wait => "do nothing this cycle",
                AgentAction::CreateFile => "DETAILS: path on the first line, content after",
                AgentAction::ReadFile => "DETAILS: path",
                AgentAction::UpdateFile => "DETAILS: path on the first line, new content after",
                AgentAction::ListFiles => "DETAILS: directory path (empty for the root)",
                AgentAction::RunCommand => "DETAILS: the command line",
                AgentAction::StartProject => "DETAILS: name on the first line, description after",
                AgentAction::WorkOnProject => "DETAILS: name on the first line, a work note after",
                AgentAction::CompleteProject => "DETAILS: project name",
                AgentAction::Share => "DETAILS: the text to share",
            };
            out.push_str(&format!("- {} ({hint})\n", action.name()));
        }
        out
    }
}

/// The parsed form of the oracle's plan response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDirective {
    /// The raw action name as the oracle wrote it
    pub action: String,
    pub reason: String,
    pub details: String,
}

impl ActionDirective {
    /// Line-oriented scan for `ACTION:` / `REASON:` / `DETAILS:` prefixes.
    ///
    /// Prefix match is case-sensitive and the first occurrence of each prefix
    /// wins. `DETAILS:` consumes the rest of the response (multi-line
    /// payloads are common for file content). A response without `ACTION:`
    /// defaults to `wait`.
    pub fn parse(text: &str) -> Self {
        let mut action: Option<String> = None;
        let mut reason: Option<String> = None;
        let mut details: Option<String> = None;

        let lines: Vec<&str> = text.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim_start();
            if action.is_none()
                && let Some(rest) = trimmed.strip_prefix("ACTION:")
            {
                action = Some(rest.trim().to_string());
            } else if reason.is_none()
                && let Some(rest) = trimmed.strip_prefix("REASON:")
            {
                reason = Some(rest.trim().to_string());
            } else if details.is_none()
                && let Some(rest) = trimmed.strip_prefix("DETAILS:")
            {
                // Everything from here to the end belongs to the payload,
                // so the prefix scan stops
                let mut body = rest.trim_start().to_string();
                for follow in &lines[i + 1..] {
                    body.push('\n');
                    body.push_str(follow);
                }
                details = Some(body.trim_end().to_string());
                break;
            }
        }

        Self {
            action: action.unwrap_or_else(|| "wait".into()),
            reason: reason.unwrap_or_default(),
            details: details.unwrap_or_default(),
        }
    }

    /// Resolve the raw action name against the vocabulary.
    pub fn resolve(&self) -> Option<AgentAction> {
        AgentAction::from_name(&self.action)
    }

    /// First line of `details` and the remainder, for actions whose payload
    /// is a name/path followed by free text.
    pub fn split_details(&self) -> (&str, &str) {
        match self.details.split_once('\n') {
            Some((head, rest)) => (head.trim(), rest.trim_matches('\n')),
            None => (self.details.trim(), ""),
        }
    }
}
