//! Snapshot phase: screenshot every compiled combination and archive the images.
//!
//! Runs strictly after the compile phase, with its own [`MtimeCache`], since a
//! snapshot is stale relative to the artifact the compile phase just wrote.
//!
//! ## Stages
//!
//! ```text
//! 1. Ensure    the snapshot history checkout exists (fatal on failure)
//! 2. Prepare   create every distinct screenshots/<theme>/ directory and
//!              drop temp files an interrupted run left there
//! 3. Fan out   one rayon task per snapshot target:
//!                capture   <url> → screenshots/<theme>/<site>.png
//!                crush     png → temp file beside it
//!                replace   temp file → png
//! 4. Archive   stage everything and amend the single history commit
//! ```
//!
//! Sites whose URL override is empty have screenshots disabled: no task is
//! created for them and they are only counted in the report.
//!
//! A failed capture or recompression is recorded against its target like a
//! compile failure. The archive step still runs afterwards so the images that
//! did change are recorded.

use crate::archive::{ArchiveError, SnapshotArchive};
use crate::atomic::{replace_with, sweep_temp_files, temp_beside};
use crate::cache::MtimeCache;
use crate::naming::{snapshot_file_name, target_name};
use crate::report::{PhaseReport, TaskResult, TaskStatus};
use crate::targets::{
    BuildTarget, OutputDirError, TargetError, create_output_dirs, distinct_dirs,
};
use crate::tools::{RecompressParams, ScreenshotParams, ToolBackend};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    OutputDir(#[from] OutputDirError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("Cannot clear temporary files in {path}: {source}")]
    Sweep {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Screenshot of one (theme, site) combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotTarget {
    /// `theme/site`, same identity as the build target.
    pub name: String,
    pub url: String,
    /// `<screenshots_dir>/<theme>/<site>.png`
    pub output: PathBuf,
    /// Compiled artifact the screenshot is taken with.
    pub stylesheet: PathBuf,
}

impl SnapshotTarget {
    /// Derive the snapshot of `target`, or `None` when its site has
    /// screenshots disabled.
    pub fn from_build(target: &BuildTarget, screenshots_root: &Path) -> Option<Self> {
        let url = target.site.url.clone()?;
        Some(Self {
            name: target_name(&target.theme.name, &target.site.name),
            url,
            output: screenshots_root
                .join(&target.theme.name)
                .join(snapshot_file_name(&target.site.name)),
            stylesheet: target.output.clone(),
        })
    }

    /// Whether the compiled artifact is newer than the snapshot.
    pub fn is_stale(&self, cache: &MtimeCache) -> bool {
        cache.mtime(&self.stylesheet) > cache.mtime(&self.output)
    }
}

/// Snapshot targets of every enabled site, and how many were disabled.
pub fn snapshot_targets(
    targets: &[BuildTarget],
    screenshots_root: &Path,
) -> (Vec<SnapshotTarget>, usize) {
    let snapshots: Vec<SnapshotTarget> = targets
        .iter()
        .filter_map(|t| SnapshotTarget::from_build(t, screenshots_root))
        .collect();
    let disabled = targets.len() - snapshots.len();
    (snapshots, disabled)
}

/// Progress events emitted during the snapshot phase.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotEvent {
    /// Emitted once, after the history checkout is in place.
    Started {
        targets: usize,
        disabled: usize,
        workers: usize,
    },
    Captured { target: String, output: PathBuf },
    Failed { target: String, error: String },
    /// The history commit was amended.
    Archived { dir: PathBuf },
}

/// Update every stale snapshot and archive the result.
pub fn update_snapshots(
    targets: &[BuildTarget],
    screenshots_root: &Path,
    backend: &impl ToolBackend,
    archive: &impl SnapshotArchive,
    cache: &MtimeCache,
    events: Option<Sender<SnapshotEvent>>,
) -> Result<PhaseReport, SnapshotError> {
    // Before any directory is created: a missing root is what triggers
    // checking out the history.
    archive.ensure()?;

    let (snapshots, disabled) = snapshot_targets(targets, screenshots_root);
    create_output_dirs(snapshots.iter().map(|s| s.output.as_path()))?;
    // The worktree is staged with `add -A`, so leftovers would be committed
    for dir in distinct_dirs(snapshots.iter().map(|s| s.output.as_path())) {
        sweep_temp_files(&dir).map_err(|source| SnapshotError::Sweep {
            path: dir.clone(),
            source,
        })?;
    }

    emit(
        &events,
        SnapshotEvent::Started {
            targets: snapshots.len(),
            disabled,
            workers: rayon::current_num_threads(),
        },
    );

    let results: Vec<TaskResult> = snapshots
        .par_iter()
        .map(|snapshot| {
            let status = match capture(snapshot, backend, cache) {
                Ok(true) => {
                    emit(
                        &events,
                        SnapshotEvent::Captured {
                            target: snapshot.name.clone(),
                            output: snapshot.output.clone(),
                        },
                    );
                    TaskStatus::Built
                }
                Ok(false) => TaskStatus::UpToDate,
                Err(e) => {
                    emit(
                        &events,
                        SnapshotEvent::Failed {
                            target: snapshot.name.clone(),
                            error: e.to_string(),
                        },
                    );
                    TaskStatus::Failed(e.to_string())
                }
            };
            TaskResult {
                target: snapshot.name.clone(),
                status,
            }
        })
        .collect();

    archive.commit()?;
    emit(
        &events,
        SnapshotEvent::Archived {
            dir: screenshots_root.to_path_buf(),
        },
    );

    Ok(PhaseReport { results, disabled })
}

/// Capture one snapshot if stale. Returns whether the image was replaced.
///
/// The recompressed copy is written beside the capture and moved over it only
/// when the recompressor succeeds; on failure the uncompressed capture stays.
pub fn capture(
    snapshot: &SnapshotTarget,
    backend: &impl ToolBackend,
    cache: &MtimeCache,
) -> Result<bool, TargetError> {
    if !snapshot.is_stale(cache) {
        return Ok(false);
    }
    backend.screenshot(&ScreenshotParams {
        url: snapshot.url.clone(),
        output: snapshot.output.clone(),
        stylesheet: snapshot.stylesheet.clone(),
    })?;

    let crushed = temp_beside(&snapshot.output, ".png")?;
    backend.recompress(&RecompressParams {
        input: snapshot.output.clone(),
        output: crushed.to_path_buf(),
    })?;
    replace_with(crushed, &snapshot.output)?;
    Ok(true)
}

fn emit(events: &Option<Sender<SnapshotEvent>>, event: SnapshotEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
