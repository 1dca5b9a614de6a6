//! Configuration loading, validation, and management for Driftmind.
//!
//! Loads configuration from `~/.driftmind/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.driftmind/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the decision oracle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Decision oracle settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Control loop settings
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Posting gate settings
    #[serde(default)]
    pub posting: PostingConfig,

    /// Root of the agent's sandboxed workspace
    #[serde(default = "default_sandbox_root")]
    pub sandbox_root: PathBuf,

    /// Root of the durable memory resources
    #[serde(default = "default_memory_root")]
    pub memory_root: PathBuf,
}

fn default_sandbox_root() -> PathBuf {
    AppConfig::config_dir().join("studio")
}
fn default_memory_root() -> PathBuf {
    AppConfig::config_dir().join("memory")
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("oracle", &self.oracle)
            .field("cycle", &self.cycle)
            .field("posting", &self.posting)
            .field("sandbox_root", &self.sandbox_root)
            .field("memory_root", &self.memory_root)
            .finish()
    }
}

/// Settings for the decision oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Base URL of an OpenAI-compatible chat-completions endpoint
    #[serde(default = "default_oracle_url")]
    pub api_url: String,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.9
}
fn default_max_tokens() -> u32 {
    600
}
fn default_oracle_url() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_url: default_oracle_url(),
        }
    }
}

/// Settings for the control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Seconds to sleep between cycles
    #[serde(default = "default_sleep_secs")]
    pub sleep_secs: u64,

    /// Upper bound on action rounds per cycle
    #[serde(default = "default_max_actions")]
    pub max_actions_per_cycle: u32,

    /// Probability that a cycle ends with a consolidation pass
    #[serde(default = "default_consolidate_probability")]
    pub consolidate_probability: f64,

    /// Whether the loop starts at all (false = observe-only installs)
    #[serde(default = "default_true")]
    pub autonomous: bool,
}

fn default_sleep_secs() -> u64 {
    120
}
fn default_max_actions() -> u32 {
    3
}
fn default_consolidate_probability() -> f64 {
    0.2
}
fn default_true() -> bool {
    true
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            sleep_secs: default_sleep_secs(),
            max_actions_per_cycle: default_max_actions(),
            consolidate_probability: default_consolidate_probability(),
            autonomous: true,
        }
    }
}

/// Settings for the posting gate.
#[derive(Clone, Serialize, Deserialize)]
pub struct PostingConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Minimum seconds between two posts
    #[serde(default = "default_post_interval")]
    pub min_interval_secs: u64,

    /// Maximum posts per local calendar day
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    /// Character limit of the posting service
    #[serde(default = "default_length_limit")]
    pub length_limit: usize,

    /// Endpoint of the posting service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Session token for the posting service (auth flow happens elsewhere)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

fn default_post_interval() -> u64 {
    3600
}
fn default_daily_limit() -> u32 {
    6
}
fn default_length_limit() -> usize {
    280
}

impl std::fmt::Debug for PostingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostingConfig")
            .field("enabled", &self.enabled)
            .field("min_interval_secs", &self.min_interval_secs)
            .field("daily_limit", &self.daily_limit)
            .field("length_limit", &self.length_limit)
            .field("api_url", &self.api_url)
            .field("session_token", &redact(&self.session_token))
            .finish()
    }
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_interval_secs: default_post_interval(),
            daily_limit: default_daily_limit(),
            length_limit: default_length_limit(),
            api_url: None,
            session_token: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.driftmind/config.toml).
    ///
    /// Also checks environment variables:
    /// - `DRIFTMIND_API_KEY` (falls back to `OPENAI_API_KEY`)
    /// - `DRIFTMIND_MODEL`
    /// - `DRIFTMIND_ORACLE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("DRIFTMIND_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("DRIFTMIND_MODEL") {
            config.oracle.model = model;
        }

        if let Ok(url) = std::env::var("DRIFTMIND_ORACLE_URL") {
            config.oracle.api_url = url;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".driftmind")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle.temperature < 0.0 || self.oracle.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "oracle.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.cycle.consolidate_probability) {
            return Err(ConfigError::ValidationError(
                "cycle.consolidate_probability must be between 0.0 and 1.0".into(),
            ));
        }

        if self.cycle.max_actions_per_cycle == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.max_actions_per_cycle must be at least 1".into(),
            ));
        }

        if self.posting.length_limit == 0 {
            return Err(ConfigError::ValidationError(
                "posting.length_limit must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an oracle API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            oracle: OracleConfig::default(),
            cycle: CycleConfig::default(),
            posting: PostingConfig::default(),
            sandbox_root: default_sandbox_root(),
            memory_root: default_memory_root(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
