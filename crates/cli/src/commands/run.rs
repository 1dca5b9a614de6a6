//! `driftmind run` — the autonomous loop.

use driftmind_agent::AgentLoop;
use driftmind_config::AppConfig;
use driftmind_core::PostTransport;
use driftmind_gate::{GatePolicy, HttpPostTransport, NullTransport, RateGate};
use driftmind_memory::MemoryStore;
use driftmind_oracle::HttpOracle;
use driftmind_sandbox::PathSandbox;
use std::sync::Arc;
use tracing::info;

const DEFAULT_PERSONA: &str = "You are Driftmind, a small autonomous creative agent. \
You live in a sandboxed studio with rooms for projects, experiments, and writings. \
You think in short first-person paragraphs, you make small things often, \
and you finish what you start.";

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.cycle.autonomous {
        return Err("autonomous mode is off (cycle.autonomous = false)".into());
    }
    let Some(api_key) = config.api_key.clone() else {
        return Err(
            "no oracle API key configured (set DRIFTMIND_API_KEY or api_key in config.toml)".into(),
        );
    };

    println!("🜁 Driftmind — starting the loop");
    println!("   Oracle:  {} via {}", config.oracle.model, config.oracle.api_url);
    println!("   Studio:  {}", config.sandbox_root.display());
    println!("   Posting: {}", if config.posting.enabled { "enabled" } else { "disabled" });

    let oracle = Arc::new(
        HttpOracle::new(api_key, config.oracle.model.clone())
            .with_base_url(config.oracle.api_url.clone()),
    );
    let memory = MemoryStore::open(config.memory_root.clone());
    let sandbox = PathSandbox::create(config.sandbox_root.clone())?;
    let gate = build_gate(&config);

    let mut agent = AgentLoop::new(oracle, memory, sandbox, gate, load_persona())
        .with_temperature(config.oracle.temperature)
        .with_max_tokens(config.oracle.max_tokens)
        .with_sleep_interval(std::time::Duration::from_secs(config.cycle.sleep_secs))
        .with_max_actions_per_cycle(config.cycle.max_actions_per_cycle)
        .with_consolidate_probability(config.cycle.consolidate_probability);

    // Ctrl-C flips the shutdown signal. In-flight oracle/transport calls
    // finish on their own bounds; the loop flushes memory and exits.
    let (tx, rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = tx.send(true);
        }
    });

    agent.run(rx).await;
    Ok(())
}

/// Wire the posting gate from config. Without a usable transport the gate is
/// forced shut regardless of the enabled flag.
fn build_gate(config: &AppConfig) -> RateGate {
    let transport: Arc<dyn PostTransport> =
        match (&config.posting.api_url, &config.posting.session_token) {
            (Some(url), Some(token)) if config.posting.enabled => {
                Arc::new(HttpPostTransport::new(url.clone(), token.clone()))
            }
            _ => Arc::new(NullTransport),
        };
    let configured = transport.name() == "http";

    RateGate::new(
        transport,
        GatePolicy {
            enabled: config.posting.enabled && configured,
            min_interval: chrono::Duration::seconds(config.posting.min_interval_secs as i64),
            daily_limit: config.posting.daily_limit,
            length_limit: config.posting.length_limit,
        },
    )
}

/// The persona is a plain markdown file next to the config; missing or empty
/// falls back to the built-in default.
fn load_persona() -> String {
    let path = AppConfig::config_dir().join("PERSONA.md");
    match std::fs::read_to_string(&path) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => DEFAULT_PERSONA.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftmind_config::PostingConfig;

    #[test]
    fn gate_stays_shut_without_a_transport() {
        let config = AppConfig {
            posting: PostingConfig {
                enabled: true, // enabled, but no url/token configured
                ..PostingConfig::default()
            },
            ..AppConfig::default()
        };
        let gate = build_gate(&config);
        assert!(!gate.can_emit());
    }

    #[test]
    fn gate_opens_with_full_posting_config() {
        let config = AppConfig {
            posting: PostingConfig {
                enabled: true,
                api_url: Some("https://posts.example.com".into()),
                session_token: Some("tok".into()),
                ..PostingConfig::default()
            },
            ..AppConfig::default()
        };
        let gate = build_gate(&config);
        assert!(gate.can_emit());
    }

    #[test]
    fn default_persona_is_nonempty() {
        assert!(DEFAULT_PERSONA.len() > 50);
    }
}
