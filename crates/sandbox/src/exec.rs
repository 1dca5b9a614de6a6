//! Command execution inside the sandbox.
//!
//! Restricted to an allowlist of read-only/informational commands, bounded
//! by a wall-clock timeout and an output ceiling. Arguments are split by
//! whitespace and passed directly — no shell sits in between, so `;` and
//! pipes cannot smuggle a second command past the allowlist.

use crate::PathSandbox;
use driftmind_core::SandboxError;
use tokio::process::Command;
use tracing::{debug, warn};

/// The result of an allowed, completed command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Whether the command exited with status 0
    pub success: bool,

    /// Exit code, when the platform reports one
    pub exit_code: Option<i32>,

    /// Merged stdout/stderr text
    pub output: String,
}

impl PathSandbox {
    /// Run an allowlisted command with `cwd` (sandbox-relative) as its
    /// working directory.
    pub async fn exec(&self, command_line: &str, cwd: &str) -> Result<ExecOutput, SandboxError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().unwrap_or("").to_string();
        let args: Vec<&str> = parts.collect();

        if !self.allowed_commands.iter().any(|c| c == &program) {
            return Err(SandboxError::CommandNotAllowed { command: program });
        }

        let workdir = if cwd.is_empty() {
            self.root().to_path_buf()
        } else {
            self.resolve(cwd)?
        };
        if !workdir.is_dir() {
            return Err(SandboxError::NotFound(cwd.to_string()));
        }

        debug!(command = %command_line, cwd = %workdir.display(), "Executing sandboxed command");

        let mut cmd = Command::new(&program);
        cmd.args(&args).current_dir(&workdir).kill_on_drop(true);

        let output = match tokio::time::timeout(self.exec_timeout, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(command = %command_line, "Sandboxed command timed out");
                return Err(SandboxError::Timeout {
                    timeout_secs: self.exec_timeout.as_secs(),
                });
            }
        };

        if output.stdout.len() + output.stderr.len() > self.max_output_bytes {
            return Err(SandboxError::OutputOverflow {
                limit: self.max_output_bytes,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let merged = if stderr.is_empty() {
            stdout.trim_end().to_string()
        } else {
            format!("{}\n[stderr]: {}", stdout.trim_end(), stderr.trim_end())
        };

        let success = output.status.success();
        if !success {
            warn!(command = %command_line, code = ?output.status.code(), "Command exited nonzero");
        }

        Ok(ExecOutput {
            success,
            exit_code: output.status.code(),
            output: merged,
        })
    }
}
