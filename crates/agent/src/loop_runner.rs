//! The agent loop implementation.

use crate::classify::classify_thought;
use driftmind_core::{
    ActionDirective, ActionOutcome, AgentAction, Oracle, OracleRequest, ProjectPatch,
    ProjectStatus, RecordKind,
};
use driftmind_gate::{EmitOutcome, RateGate};
use driftmind_memory::{ContextSnapshot, MemoryStore};
use driftmind_sandbox::PathSandbox;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What a single cycle did.
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    pub thought_kind: RecordKind,
    pub actions_dispatched: u32,
    pub consolidated: usize,
}

/// The core loop orchestrating oracle calls, action dispatch, and memory.
///
/// The loop owns its collaborators and runs strictly sequentially: no two
/// cycles and no two dispatches overlap, so memory mutation is never
/// contended.
pub struct AgentLoop {
    /// The decision oracle
    oracle: Arc<dyn Oracle>,

    /// The agent's memory
    memory: MemoryStore,

    /// Contained workspace for file actions
    sandbox: PathSandbox,

    /// Admission control for the posting side effect
    gate: RateGate,

    /// The agent's persona (system text for every oracle request)
    persona: String,

    /// Sampling temperature
    temperature: f32,

    /// Token ceiling per oracle response
    max_tokens: u32,

    /// Sleep between cycles
    sleep_interval: Duration,

    /// Upper bound on action rounds per cycle
    max_actions_per_cycle: u32,

    /// Chance that a cycle ends with a consolidation pass
    consolidate_probability: f64,

    /// Dice for the consolidation trigger (seedable for tests)
    rng: StdRng,

    cycles_completed: u64,
}

impl AgentLoop {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        memory: MemoryStore,
        sandbox: PathSandbox,
        gate: RateGate,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            oracle,
            memory,
            sandbox,
            gate,
            persona: persona.into(),
            temperature: 0.9,
            max_tokens: 600,
            sleep_interval: Duration::from_secs(120),
            max_actions_per_cycle: 3,
            consolidate_probability: 0.2,
            rng: StdRng::from_os_rng(),
            cycles_completed: 0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_sleep_interval(mut self, interval: Duration) -> Self {
        self.sleep_interval = interval;
        self
    }

    pub fn with_max_actions_per_cycle(mut self, max: u32) -> Self {
        self.max_actions_per_cycle = max;
        self
    }

    pub fn with_consolidate_probability(mut self, probability: f64) -> Self {
        self.consolidate_probability = probability;
        self
    }

    /// Seed the consolidation dice (tests pin the trigger this way).
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Run until the shutdown signal flips to `true`.
    ///
    /// A failed cycle is reported and absorbed; the loop sleeps and retries.
    /// On shutdown, pending memory is flushed and a diagnostic snapshot
    /// written before returning.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Agent loop starting");

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.cycle().await {
                Ok(report) => debug!(
                    kind = ?report.thought_kind,
                    actions = report.actions_dispatched,
                    consolidated = report.consolidated,
                    "Cycle complete"
                ),
                Err(e) => error!(error = %e, "Cycle failed; retrying after sleep"),
            }
            self.cycles_completed += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.sleep_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Flush pending memory before the process ends
        if let Err(e) = self.memory.persist() {
            warn!(error = %e, "Final persist failed");
        }
        match self.memory.write_snapshot() {
            Ok(Some(path)) => info!(path = %path.display(), "Wrote shutdown snapshot"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Shutdown snapshot failed"),
        }
        info!(cycles = self.cycles_completed, "Agent loop stopped");
    }

    /// One full cycle. Errors surface to `run`, which reports and continues.
    pub async fn cycle(&mut self) -> driftmind_core::Result<CycleReport> {
        let ctx = self.memory.get_context();

        // ── Thought ──
        let thought = self.oracle.complete(self.muse_request(&ctx)).await?;
        let kind = classify_thought(&thought);
        self.memory.add_thought(thought.as_str(), kind);
        debug!(?kind, chars = thought.len(), "Thought recorded");

        // ── Actions ──
        let mut dispatched = 0;
        for _ in 0..self.max_actions_per_cycle {
            let plan = match self.oracle.complete(self.plan_request(&ctx)).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Plan request failed; ending action phase");
                    break;
                }
            };

            let directive = ActionDirective::parse(&plan);
            let Some(action) = directive.resolve() else {
                warn!(action = %directive.action, "Oracle chose an unknown action");
                self.memory.add_action(
                    directive.action.as_str(),
                    ActionOutcome::Failure,
                    "unrecognized action name",
                );
                dispatched += 1;
                continue;
            };

            if action == AgentAction::Wait {
                let detail = if directive.reason.is_empty() {
                    "resting".to_string()
                } else {
                    directive.reason.clone()
                };
                self.memory.add_action("wait", ActionOutcome::Success, detail);
                dispatched += 1;
                break;
            }

            let (outcome, detail) = self.dispatch(action, &directive).await;
            debug!(action = action.name(), ?outcome, "Action dispatched");
            self.memory.add_action(action.name(), outcome, detail);
            dispatched += 1;
        }

        // ── Maybe consolidate ──
        let consolidated = if self.rng.random::<f64>() < self.consolidate_probability {
            self.memory.consolidate()
        } else {
            0
        };

        // ── Persist ──
        if let Err(e) = self.memory.persist() {
            warn!(error = %e, "Persist failed; continuing with in-memory state");
        }

        Ok(CycleReport {
            thought_kind: kind,
            actions_dispatched: dispatched,
            consolidated,
        })
    }

    /// Dispatch one action. Failures become `Failure` outcomes, never errors.
    async fn dispatch(
        &mut self,
        action: AgentAction,
        directive: &ActionDirective,
    ) -> (ActionOutcome, String) {
        match action {
            AgentAction::Wait => (ActionOutcome::Success, "waiting".into()),

            AgentAction::CreateFile => {
                let (path, content) = directive.split_details();
                if path.is_empty() {
                    return (ActionOutcome::Failure, "no path given".into());
                }
                match self.sandbox.create_file(path, content).await {
                    Ok(receipt) => {
                        let path = receipt.path.clone();
                        self.note_file_for_project(&path);
                        (
                            ActionOutcome::Success,
                            format!("wrote {} bytes to {path}", receipt.bytes),
                        )
                    }
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::UpdateFile => {
                let (path, content) = directive.split_details();
                if path.is_empty() {
                    return (ActionOutcome::Failure, "no path given".into());
                }
                match self.sandbox.update_file(path, content).await {
                    Ok(receipt) => {
                        let path = receipt.path.clone();
                        self.note_file_for_project(&path);
                        (
                            ActionOutcome::Success,
                            format!("rewrote {path} ({} bytes)", receipt.bytes),
                        )
                    }
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::ReadFile => {
                let (path, _) = directive.split_details();
                match self.sandbox.read_file(path).await {
                    Ok(content) => (
                        ActionOutcome::Success,
                        format!("{path}: {}", preview(&content, 200)),
                    ),
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::ListFiles => {
                let (path, _) = directive.split_details();
                match self.sandbox.list_dir(path).await {
                    Ok(entries) if entries.is_empty() => {
                        (ActionOutcome::Success, format!("{path}: empty"))
                    }
                    Ok(entries) => {
                        let names: Vec<String> = entries
                            .iter()
                            .map(|e| {
                                if e.is_dir {
                                    format!("{}/", e.name)
                                } else {
                                    e.name.clone()
                                }
                            })
                            .collect();
                        (ActionOutcome::Success, names.join(", "))
                    }
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::RunCommand => {
                let command_line = directive.details.trim();
                if command_line.is_empty() {
                    return (ActionOutcome::Failure, "no command given".into());
                }
                match self.sandbox.exec(command_line, "").await {
                    Ok(result) => {
                        let outcome = if result.success {
                            ActionOutcome::Success
                        } else {
                            ActionOutcome::Failure
                        };
                        (outcome, preview(&result.output, 300))
                    }
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::StartProject => {
                let (name, description) = directive.split_details();
                if name.is_empty() {
                    return (ActionOutcome::Failure, "no project name given".into());
                }
                match self.memory.add_project(name, description, ProjectStatus::Active) {
                    Ok(project) => {
                        // Starting a project is the only way the active count
                        // grows, so the cap is enforced here.
                        let demoted = self.memory.cleanup_projects();
                        let mut detail = format!("started '{}'", project.name);
                        if demoted > 0 {
                            detail.push_str(&format!(" ({demoted} older project(s) completed)"));
                        }
                        (ActionOutcome::Success, detail)
                    }
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::WorkOnProject => {
                let (name, note) = directive.split_details();
                let Some(id) = self.memory.find_active_project(name).map(|p| p.id.clone())
                else {
                    return (
                        ActionOutcome::Failure,
                        format!("no active project named '{name}'"),
                    );
                };
                let note = if note.is_empty() { directive.reason.as_str() } else { note };
                let patch = ProjectPatch::note(note);
                match self.memory.update_project(&id, patch) {
                    Ok(Some(project)) => (
                        ActionOutcome::Success,
                        format!("logged progress on '{}'", project.name),
                    ),
                    Ok(None) => (ActionOutcome::Failure, format!("project '{name}' vanished")),
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::CompleteProject => {
                let (name, _) = directive.split_details();
                let Some(id) = self.memory.find_active_project(name).map(|p| p.id.clone())
                else {
                    return (
                        ActionOutcome::Failure,
                        format!("no active project named '{name}'"),
                    );
                };
                match self
                    .memory
                    .update_project(&id, ProjectPatch::status(ProjectStatus::Completed))
                {
                    Ok(Some(project)) => (
                        ActionOutcome::Success,
                        format!("completed '{}'", project.name),
                    ),
                    Ok(None) => (ActionOutcome::Failure, format!("project '{name}' vanished")),
                    Err(e) => (ActionOutcome::Failure, e.to_string()),
                }
            }

            AgentAction::Share => {
                let text = directive.details.trim();
                if text.is_empty() {
                    return (ActionOutcome::Failure, "nothing to share".into());
                }
                let kind = classify_thought(text);
                if !self.gate.should_emit(text, kind) {
                    return (ActionOutcome::Failure, "content not suited for sharing".into());
                }
                match self.gate.emit(text, kind).await {
                    EmitOutcome::Posted { id, text } => {
                        let id = id.unwrap_or_else(|| "?".into());
                        (
                            ActionOutcome::Success,
                            format!("shared {} chars (post {id})", text.chars().count()),
                        )
                    }
                    EmitOutcome::Skipped { reason } => {
                        (ActionOutcome::Failure, format!("skipped: {reason}"))
                    }
                    EmitOutcome::Failed { error } => {
                        (ActionOutcome::Failure, format!("transport failed: {error}"))
                    }
                }
            }
        }
    }

    /// If a written path sits inside `projects/<name>/`, attach it to the
    /// matching active project.
    fn note_file_for_project(&mut self, path: &str) {
        let mut parts = path.split('/');
        if parts.next() != Some("projects") {
            return;
        }
        let Some(segment) = parts.next() else {
            return;
        };
        if parts.next().is_none() {
            return; // a file directly under projects/ belongs to nobody
        }

        let candidate = segment.replace(['-', '_'], " ");
        let Some(id) = self
            .memory
            .find_active_project(&candidate)
            .map(|p| p.id.clone())
        else {
            return;
        };

        let patch = ProjectPatch {
            file: Some(path.to_string()),
            ..ProjectPatch::default()
        };
        if let Err(e) = self.memory.update_project(&id, patch) {
            warn!(error = %e, path, "Failed to attach file to project");
        }
    }

    fn muse_request(&self, ctx: &ContextSnapshot) -> OracleRequest {
        let mut prompt = String::from(
            "What's on your mind right now? Reply with a single first-person paragraph.",
        );
        if !ctx.active_projects.is_empty() {
            let names: Vec<&str> = ctx
                .active_projects
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            prompt.push_str(&format!("\nYour active projects: {}.", names.join(", ")));
        }

        OracleRequest::new(&self.persona, prompt)
            .with_context(ctx.recent_thoughts.iter().map(|r| r.content.clone()).collect())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    fn plan_request(&self, ctx: &ContextSnapshot) -> OracleRequest {
        let mut prompt = String::from(
            "Choose your next action. Reply with exactly these three lines:\n\
             ACTION: <name>\nREASON: <one line>\nDETAILS: <payload>\n\n\
             Available actions:\n",
        );
        prompt.push_str(&AgentAction::vocabulary_lines());

        if !ctx.recent_actions.is_empty() {
            prompt.push_str("\nYour recent actions:\n");
            for rec in &ctx.recent_actions {
                let name = rec.action_name.as_deref().unwrap_or("?");
                let outcome = match rec.outcome {
                    Some(ActionOutcome::Success) => "ok",
                    _ => "failed",
                };
                prompt.push_str(&format!("- {name} ({outcome})\n"));
            }
        }

        OracleRequest::new(&self.persona, prompt)
            .with_context(ctx.recent_thoughts.iter().map(|r| r.content.clone()).collect())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

fn preview(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max {
        trimmed.to_string()
    } else {
        let mut cut: String = trimmed.chars().take(max).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use driftmind_core::{OracleError, PostReceipt, PostTransport, TransportError};
    use driftmind_gate::GatePolicy;
    use driftmind_oracle::ScriptedOracle;
    use std::sync::Mutex;

    const PERSONA: &str = "You are a small autonomous machine that makes things.";

    fn closed_gate() -> RateGate {
        RateGate::new(
            Arc::new(driftmind_gate::NullTransport),
            GatePolicy {
                enabled: false,
                ..GatePolicy::default()
            },
        )
    }

    fn make_loop(script: Vec<&str>) -> (tempfile::TempDir, AgentLoop) {
        let tmp = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::create(tmp.path().join("studio")).unwrap();
        let agent = AgentLoop::new(
            Arc::new(ScriptedOracle::new(script)),
            MemoryStore::ephemeral(),
            sandbox,
            closed_gate(),
            PERSONA,
        )
        .with_consolidate_probability(0.0)
        .with_rng_seed(7);
        (tmp, agent)
    }

    /// Transport that counts accepted posts.
    struct CountingTransport {
        posts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PostTransport for CountingTransport {
        fn name(&self) -> &str {
            "counting"
        }

        async fn post(&self, text: &str) -> Result<PostReceipt, TransportError> {
            self.posts.lock().unwrap().push(text.to_string());
            Ok(PostReceipt { id: Some("p1".into()) })
        }
    }

    /// Oracle whose every request fails.
    struct DownOracle;

    #[async_trait]
    impl Oracle for DownOracle {
        fn name(&self) -> &str {
            "down"
        }

        async fn complete(&self, _request: OracleRequest) -> Result<String, OracleError> {
            Err(OracleError::Network("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn thought_is_classified_and_recorded() {
        let (_tmp, mut agent) = make_loop(vec![
            "I wonder what's next",
            "ACTION: wait\nREASON: just settling in",
        ]);

        let report = agent.cycle().await.unwrap();
        assert_eq!(report.thought_kind, RecordKind::Curiosity);

        let records = agent.memory().session_records();
        assert_eq!(records[0].kind, RecordKind::Curiosity);
        assert_eq!(records[0].content, "I wonder what's next");
    }

    #[tokio::test]
    async fn wait_ends_the_action_phase_early() {
        let oracle = Arc::new(ScriptedOracle::new([
            "a plain thought about the afternoon light",
            "ACTION: wait\nREASON: pausing",
        ]));
        let tmp = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::create(tmp.path().join("studio")).unwrap();
        let mut agent = AgentLoop::new(
            oracle.clone(),
            MemoryStore::ephemeral(),
            sandbox,
            closed_gate(),
            PERSONA,
        )
        .with_max_actions_per_cycle(3)
        .with_consolidate_probability(0.0);

        let report = agent.cycle().await.unwrap();
        assert_eq!(report.actions_dispatched, 1);
        // One muse request + one plan request; the wait cut rounds 2 and 3
        assert_eq!(oracle.requests_served(), 2);
    }

    #[tokio::test]
    async fn unknown_action_is_recoverable() {
        let (_tmp, mut agent) = make_loop(vec![
            "a plain thought about dust on the shelf",
            "ACTION: summon_moon\nREASON: ambition",
            "ACTION: wait",
        ]);

        let report = agent.cycle().await.unwrap();
        assert_eq!(report.actions_dispatched, 2);

        let records = agent.memory().session_records();
        let failed = records
            .iter()
            .find(|r| r.action_name.as_deref() == Some("summon_moon"))
            .expect("failure should be recorded");
        assert_eq!(failed.outcome, Some(ActionOutcome::Failure));
    }

    #[tokio::test]
    async fn create_file_action_writes_into_the_sandbox() {
        let (_tmp, mut agent) = make_loop(vec![
            "a plain thought before making something",
            "ACTION: create_file\nREASON: sketching\nDETAILS: writings/sketch.md\nA line of prose.",
            "ACTION: wait",
        ]);

        agent.cycle().await.unwrap();

        let records = agent.memory().session_records();
        let action = records
            .iter()
            .find(|r| r.action_name.as_deref() == Some("create_file"))
            .unwrap();
        assert_eq!(action.outcome, Some(ActionOutcome::Success));
        assert!(action.details.as_deref().unwrap().contains("writings/sketch.md"));
    }

    #[tokio::test]
    async fn created_file_content_matches_the_directive() {
        let tmp = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::create(tmp.path().join("studio")).unwrap();
        let root = sandbox.root().to_path_buf();
        let mut agent = AgentLoop::new(
            Arc::new(ScriptedOracle::new([
                "a plain thought before making something",
                "ACTION: create_file\nREASON: sketching\nDETAILS: writings/sketch.md\nA line of prose.\nAnd another.",
                "ACTION: wait",
            ])),
            MemoryStore::ephemeral(),
            sandbox,
            closed_gate(),
            PERSONA,
        )
        .with_consolidate_probability(0.0);

        agent.cycle().await.unwrap();

        let written = std::fs::read_to_string(root.join("writings/sketch.md")).unwrap();
        assert_eq!(written, "A line of prose.\nAnd another.");
    }

    #[tokio::test]
    async fn containment_violation_becomes_a_failure_outcome() {
        let (_tmp, mut agent) = make_loop(vec![
            "a plain thought about elsewhere",
            "ACTION: create_file\nREASON: escape\nDETAILS: ../outside.txt\nnope",
            "ACTION: wait",
        ]);

        let report = agent.cycle().await.unwrap();
        assert_eq!(report.actions_dispatched, 2);

        let records = agent.memory().session_records();
        let action = records
            .iter()
            .find(|r| r.action_name.as_deref() == Some("create_file"))
            .unwrap();
        assert_eq!(action.outcome, Some(ActionOutcome::Failure));
        assert!(action.details.as_deref().unwrap().contains("sandbox"));
    }

    #[tokio::test]
    async fn start_project_registers_and_enforces_the_cap() {
        let (_tmp, mut agent) = make_loop(vec![
            "a plain thought about beginnings",
            "ACTION: start_project\nREASON: a new thing\nDETAILS: tide poems\nshort poems about the sea",
            "ACTION: wait",
        ]);

        agent.cycle().await.unwrap();

        let projects = agent.memory().projects();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "tide poems");
        assert!(projects[0].is_active());
    }

    #[tokio::test]
    async fn share_action_goes_through_the_gate() {
        let transport = Arc::new(CountingTransport {
            posts: Mutex::new(Vec::new()),
        });
        let gate = RateGate::new(
            transport.clone(),
            GatePolicy {
                enabled: true,
                min_interval: chrono::Duration::zero(),
                daily_limit: 10,
                length_limit: 280,
            },
        );

        let tmp = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::create(tmp.path().join("studio")).unwrap();
        let mut agent = AgentLoop::new(
            Arc::new(ScriptedOracle::new([
                "a plain thought worth keeping to myself",
                "ACTION: share\nREASON: proud of this\nDETAILS: I finished a small poem about the tide today",
                "ACTION: wait",
            ])),
            MemoryStore::ephemeral(),
            sandbox,
            gate,
            PERSONA,
        )
        .with_consolidate_probability(0.0);

        agent.cycle().await.unwrap();

        let posts = transport.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].contains("poem about the tide"));
    }

    #[tokio::test]
    async fn consolidation_runs_when_the_dice_say_so() {
        let tmp = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::create(tmp.path().join("studio")).unwrap();
        let mut agent = AgentLoop::new(
            Arc::new(ScriptedOracle::new([
                "I completed the task",
                "ACTION: wait\nREASON: done for now",
            ])),
            MemoryStore::ephemeral(),
            sandbox,
            closed_gate(),
            PERSONA,
        )
        .with_consolidate_probability(1.0);

        let report = agent.cycle().await.unwrap();
        assert_eq!(report.thought_kind, RecordKind::Achievement);
        // The achievement and the successful wait action both moved
        assert_eq!(report.consolidated, 2);
        assert_eq!(agent.memory().archive_len(), 2);
    }

    #[tokio::test]
    async fn oracle_outage_fails_the_cycle_not_the_caller() {
        let tmp = tempfile::tempdir().unwrap();
        let sandbox = PathSandbox::create(tmp.path().join("studio")).unwrap();
        let mut agent = AgentLoop::new(
            Arc::new(DownOracle),
            MemoryStore::ephemeral(),
            sandbox,
            closed_gate(),
            PERSONA,
        );

        assert!(agent.cycle().await.is_err());
        // Nothing was recorded for the failed cycle
        assert_eq!(agent.memory().session_len(), 0);
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop_and_flushes_memory() {
        let tmp = tempfile::tempdir().unwrap();
        let memory_root = tmp.path().join("memory");
        let sandbox = PathSandbox::create(tmp.path().join("studio")).unwrap();

        let mut agent = AgentLoop::new(
            Arc::new(ScriptedOracle::new([
                "I completed the warm-up",
                "ACTION: wait\nREASON: pacing myself",
            ])),
            MemoryStore::open(memory_root.clone()),
            sandbox,
            closed_gate(),
            PERSONA,
        )
        .with_sleep_interval(Duration::from_millis(20))
        .with_consolidate_probability(1.0);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { agent.run(rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop should stop after shutdown")
            .unwrap();

        // Durable resources and the shutdown snapshot are on disk
        assert!(memory_root.join("archive.json").exists());
        assert!(memory_root.join("experience.json").exists());
        assert!(memory_root.join("projects.json").exists());
        let snapshots: Vec<_> = std::fs::read_dir(memory_root.join("snapshots"))
            .unwrap()
            .collect();
        assert!(!snapshots.is_empty());
    }
}
