//! Filesystem sandbox — containment-checked file operations under a fixed root.
//!
//! Every path-accepting operation resolves the requested path against the
//! sandbox root first and rejects anything whose resolved absolute path is
//! not a descendant of the root. This is the single security invariant of
//! the component and holds through `..` segments, absolute inputs, and
//! symlink indirection.

mod exec;

pub use exec::ExecOutput;

use driftmind_core::SandboxError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Subdirectories created under the root on initialization.
pub const WORKSPACE_SUBDIRS: [&str; 4] = ["projects", "experiments", "writings", "temp"];

/// Extensions the agent may write. Files without an extension are also fine.
const ALLOWED_EXTENSIONS: [&str; 9] = [
    "txt", "md", "json", "csv", "toml", "py", "js", "html", "css",
];

/// Read-only/informational commands the agent may run.
const ALLOWED_COMMANDS: [&str; 10] = [
    "ls", "cat", "head", "tail", "wc", "grep", "find", "date", "pwd", "echo",
];

const DEFAULT_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;
const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(5);

/// Receipt for a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReceipt {
    /// The sandbox-relative path as requested
    pub path: String,
    /// Bytes written
    pub bytes: usize,
}

/// One entry from a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Aggregate counts from a recursive walk of the sandbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SandboxStats {
    pub files: usize,
    pub directories: usize,
    pub total_bytes: u64,
}

/// A containment-checked workspace rooted at a fixed directory.
pub struct PathSandbox {
    /// Canonicalized root; all resolution is checked against this prefix
    root: PathBuf,
    max_file_bytes: usize,
    max_output_bytes: usize,
    exec_timeout: Duration,
    allowed_commands: Vec<String>,
}

impl PathSandbox {
    /// Create a sandbox at `root`, creating the root and its fixed
    /// subdirectories if they do not exist yet.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, SandboxError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;

        for sub in WORKSPACE_SUBDIRS {
            std::fs::create_dir_all(root.join(sub))?;
        }
        debug!(root = %root.display(), "Sandbox initialized");

        Ok(Self {
            root,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
            allowed_commands: ALLOWED_COMMANDS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Override the write-size ceiling.
    pub fn with_max_file_bytes(mut self, limit: usize) -> Self {
        self.max_file_bytes = limit;
        self
    }

    /// Override the exec output ceiling.
    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// Override the exec wall-clock timeout.
    pub fn with_exec_timeout(mut self, timeout: Duration) -> Self {
        self.exec_timeout = timeout;
        self
    }

    /// Replace the command allowlist.
    pub fn with_allowed_commands(mut self, commands: Vec<String>) -> Self {
        self.allowed_commands = commands;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a sandbox-relative path and enforce containment.
    ///
    /// Absolute inputs and `..` segments are rejected outright; for anything
    /// else the existing part of the path is canonicalized (resolving
    /// symlinks) and the result must still sit under the root.
    fn resolve(&self, requested: &str) -> Result<PathBuf, SandboxError> {
        let containment = || SandboxError::Containment {
            path: requested.to_string(),
        };

        let requested_path = Path::new(requested);
        if requested_path.is_absolute() {
            return Err(containment());
        }
        if requested
            .replace('\\', "/")
            .split('/')
            .any(|segment| segment == "..")
        {
            return Err(containment());
        }

        let candidate = self.root.join(requested_path);

        // Canonicalize what exists so symlinks cannot point us outside.
        let canonical = if candidate.exists() {
            candidate.canonicalize()?
        } else if let Some(parent) = candidate.parent()
            && parent.exists()
        {
            parent
                .canonicalize()?
                .join(candidate.file_name().unwrap_or_default())
        } else {
            candidate
        };

        if !canonical.starts_with(&self.root) {
            return Err(containment());
        }
        Ok(canonical)
    }

    /// Reject extensions outside the allow-list (no extension is fine).
    fn check_extension(&self, resolved: &Path) -> Result<(), SandboxError> {
        match resolved.extension().and_then(|e| e.to_str()) {
            None => Ok(()),
            Some(ext) => {
                let lower = ext.to_lowercase();
                if ALLOWED_EXTENSIONS.contains(&lower.as_str()) {
                    Ok(())
                } else {
                    Err(SandboxError::Extension { extension: lower })
                }
            }
        }
    }

    fn check_size(&self, content: &str) -> Result<(), SandboxError> {
        if content.len() > self.max_file_bytes {
            return Err(SandboxError::TooLarge {
                size: content.len(),
                limit: self.max_file_bytes,
            });
        }
        Ok(())
    }

    /// Create a new file. Fails if the file already exists.
    pub async fn create_file(&self, path: &str, content: &str) -> Result<FileReceipt, SandboxError> {
        let resolved = self.resolve(path)?;
        self.check_extension(&resolved)?;
        self.check_size(content)?;

        if resolved.exists() {
            return Err(SandboxError::Io(format!("'{path}' already exists")));
        }
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&resolved, content).await?;

        debug!(path = %path, bytes = content.len(), "Created file");
        Ok(FileReceipt {
            path: path.to_string(),
            bytes: content.len(),
        })
    }

    /// Overwrite an existing file.
    pub async fn update_file(&self, path: &str, content: &str) -> Result<FileReceipt, SandboxError> {
        let resolved = self.resolve(path)?;
        self.check_extension(&resolved)?;
        self.check_size(content)?;

        if !resolved.is_file() {
            return Err(SandboxError::NotFound(path.to_string()));
        }
        tokio::fs::write(&resolved, content).await?;

        debug!(path = %path, bytes = content.len(), "Updated file");
        Ok(FileReceipt {
            path: path.to_string(),
            bytes: content.len(),
        })
    }

    /// Read a file back as UTF-8 text.
    pub async fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        let resolved = self.resolve(path)?;
        Ok(tokio::fs::read_to_string(&resolved).await?)
    }

    /// Delete a file (not a directory).
    pub async fn delete_file(&self, path: &str) -> Result<(), SandboxError> {
        let resolved = self.resolve(path)?;
        if !resolved.is_file() {
            return Err(SandboxError::NotFound(path.to_string()));
        }
        tokio::fs::remove_file(&resolved).await?;
        debug!(path = %path, "Deleted file");
        Ok(())
    }

    /// List a directory. An empty path lists the root.
    pub async fn list_dir(&self, path: &str) -> Result<Vec<DirEntryInfo>, SandboxError> {
        let resolved = if path.is_empty() {
            self.root.clone()
        } else {
            self.resolve(path)?
        };
        if !resolved.is_dir() {
            return Err(SandboxError::NotFound(path.to_string()));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&resolved).await?;
        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: meta.is_dir(),
                size: meta.len(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Create a directory (and any missing parents) under the root.
    pub async fn make_dir(&self, path: &str) -> Result<(), SandboxError> {
        let resolved = self.resolve(path)?;
        tokio::fs::create_dir_all(&resolved).await?;
        Ok(())
    }

    /// Walk the sandbox and return aggregate counts.
    ///
    /// Recursion depth is bounded; sandbox content is agent-created, so
    /// anything deeper than the bound is counted as far as the bound allows.
    pub fn stats(&self) -> Result<SandboxStats, SandboxError> {
        const MAX_DEPTH: usize = 32;

        let mut stats = SandboxStats::default();
        let mut stack: Vec<(PathBuf, usize)> = vec![(self.root.clone(), 0)];

        while let Some((dir, depth)) = stack.pop() {
            if depth >= MAX_DEPTH {
                continue;
            }
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let meta = entry.metadata()?;
                if meta.is_dir() {
                    stats.directories += 1;
                    stack.push((entry.path(), depth + 1));
                } else {
                    stats.files += 1;
                    stats.total_bytes += meta.len();
                }
            }
        }
        Ok(stats)
    }
}
