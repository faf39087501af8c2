//! Snapshot history kept as a single amended git commit.
//!
//! The screenshots directory is a git worktree checked out on a dedicated
//! branch. Every snapshot run amends the branch tip instead of adding a new
//! commit, so the branch always holds exactly one commit describing the
//! current set of images and old images do not pile up in history.
//!
//! ```text
//! project/                 # main checkout
//! └── screenshots/         # worktree on branch `screenshots`
//!     ├── .git             # file pointing back at project/.git
//!     └── dark-a/
//!         └── home.png
//! ```
//!
//! [`SnapshotArchive`] is the seam the snapshot scheduler talks to;
//! [`GitArchive`] is the production implementation.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Cannot run git: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("`git {command}` failed: {stderr}")]
    Git { command: String, stderr: String },
    #[error("snapshot history at {0} was not recognized as the expected archive, aborting commit")]
    NotAnArchive(PathBuf),
}

/// Where snapshot images are recorded.
pub trait SnapshotArchive: Sync {
    /// Make sure the history checkout exists before any image is written.
    fn ensure(&self) -> Result<(), ArchiveError>;

    /// Record the current images, replacing the previous record.
    fn commit(&self) -> Result<(), ArchiveError>;
}

/// Snapshot history in a git worktree.
#[derive(Debug, Clone)]
pub struct GitArchive {
    /// Main checkout that owns the worktree.
    pub project_root: PathBuf,
    /// Worktree directory, i.e. the screenshots root.
    pub dir: PathBuf,
    pub branch: String,
    pub message: String,
}

impl GitArchive {
    pub fn new(project_root: &Path, dir: &Path, branch: &str, message: &str) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            dir: dir.to_path_buf(),
            branch: branch.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether `dir` looks like a git checkout of its own.
    ///
    /// A worktree has a `.git` file, a clone a `.git` directory; either will do.
    pub fn is_checkout(&self) -> bool {
        self.dir.join(".git").exists()
    }
}

impl SnapshotArchive for GitArchive {
    /// Create the worktree when the screenshots directory is missing.
    ///
    /// Stale worktree registrations (a deleted screenshots directory still
    /// known to git) are pruned first, otherwise `worktree add` refuses.
    fn ensure(&self) -> Result<(), ArchiveError> {
        if self.dir.exists() {
            return Ok(());
        }
        git(&self.project_root, &["worktree", "prune"])?;
        let dir = self.dir.to_string_lossy();
        git(
            &self.project_root,
            &["worktree", "add", dir.as_ref(), self.branch.as_str()],
        )
    }

    fn commit(&self) -> Result<(), ArchiveError> {
        if !self.is_checkout() {
            return Err(ArchiveError::NotAnArchive(self.dir.clone()));
        }
        git(&self.dir, &["add", "-A"])?;
        git(&self.dir, &["commit", "--amend", "-m", self.message.as_str()])
    }
}

/// Run `git -C <dir> <args>`, mapping a non-zero exit to [`ArchiveError::Git`].
fn git(dir: &Path, args: &[&str]) -> Result<(), ArchiveError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(ArchiveError::Spawn)?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(ArchiveError::Git {
        command: args.join(" "),
        stderr,
    })
}
