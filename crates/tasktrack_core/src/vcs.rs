//! Version-control mirroring of the record file.
//!
//! # Responsibility
//! - Record one history entry per successful tracker mutation.
//!
//! # Invariants
//! - Mirroring is best-effort: callers log failures and keep going.
//! - Only the given path is staged and committed.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Failure of a history commit.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run git {step}: {source}")]
    Spawn {
        step: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("git {step} exited with {status}: {stderr}")]
    Failed {
        step: &'static str,
        status: String,
        stderr: String,
    },
}

/// History sink for persisted record files.
pub trait VersionedPersistence {
    /// Records the current content of `path` under `message`.
    fn commit(&self, path: &Path, message: &str) -> Result<(), VcsError>;
}

/// Mirrors commits into a git repository rooted at the data directory.
#[derive(Debug, Clone)]
pub struct GitCommitter {
    repo_root: PathBuf,
}

impl GitCommitter {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn ensure_repository(&self) -> Result<(), VcsError> {
        if self.repo_root.join(".git").exists() {
            return Ok(());
        }
        self.run("init", &["init", "--quiet"])
    }

    fn run(&self, step: &'static str, args: &[&str]) -> Result<(), VcsError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .map_err(|source| VcsError::Spawn { step, source })?;

        if output.status.success() {
            return Ok(());
        }
        Err(VcsError::Failed {
            step,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl VersionedPersistence for GitCommitter {
    fn commit(&self, path: &Path, message: &str) -> Result<(), VcsError> {
        self.ensure_repository()?;

        let relative = path.strip_prefix(&self.repo_root).unwrap_or(path);
        let target = relative.to_string_lossy();
        self.run("add", &["add", "--", target.as_ref()])?;
        self.run(
            "commit",
            &["commit", "--quiet", "-m", message, "--", target.as_ref()],
        )
    }
}

/// Disables history mirroring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCommitter;

impl VersionedPersistence for NoopCommitter {
    fn commit(&self, _path: &Path, _message: &str) -> Result<(), VcsError> {
        Ok(())
    }
}
