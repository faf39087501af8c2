//! Compile phase: rebuild every stale artifact in parallel.
//!
//! ## Two-Phase Protocol
//!
//! ```text
//! 1. Prepare   create every distinct css/<theme>/ directory, sequentially
//! 2. Fan out   one rayon task per target: re-check staleness, compile, write
//! ```
//!
//! Directory creation happens before any worker starts so two tasks never
//! race to create the same new directory. Targets never depend on each other's
//! artifacts, so the fan-out has no ordering constraints.
//!
//! ## Failures
//!
//! A compiler failure or write error is recorded against its target and the
//! phase carries on; the returned [`PhaseReport`] lists every failure. Only
//! the preparation step can fail the whole phase.
//!
//! ## Output
//!
//! ```text
//! css/
//! ├── dark-a/
//! │   ├── dark-a-home.css
//! │   └── dark-a-about.css
//! └── plain/
//!     └── plain-home.css
//! ```

use crate::atomic::write_atomic;
use crate::cache::MtimeCache;
use crate::report::{PhaseReport, TaskResult, TaskStatus};
use crate::targets::{BuildTarget, OutputDirError, TargetError, create_output_dirs};
use crate::tools::{CompileParams, ToolBackend};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    OutputDir(#[from] OutputDirError),
}

/// Progress events emitted while compiling.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileEvent {
    /// Emitted once before the fan-out.
    Started { targets: usize, workers: usize },
    /// An artifact was written.
    Compiled { target: String, output: PathBuf },
    /// A target failed; its siblings are unaffected.
    Failed { target: String, error: String },
}

/// Build every stale target.
///
/// Staleness is judged against `cache`, which should be fresh for this phase.
pub fn build_all(
    targets: &[BuildTarget],
    include_dir: &Path,
    backend: &impl ToolBackend,
    cache: &MtimeCache,
    events: Option<Sender<CompileEvent>>,
) -> Result<PhaseReport, CompileError> {
    create_output_dirs(targets.iter().map(|t| t.output.as_path()))?;

    emit(
        &events,
        CompileEvent::Started {
            targets: targets.len(),
            workers: rayon::current_num_threads(),
        },
    );

    let results: Vec<TaskResult> = targets
        .par_iter()
        .map(|target| {
            let status = match compile_target(target, include_dir, backend, cache) {
                Ok(true) => {
                    emit(
                        &events,
                        CompileEvent::Compiled {
                            target: target.name(),
                            output: target.output.clone(),
                        },
                    );
                    TaskStatus::Built
                }
                Ok(false) => TaskStatus::UpToDate,
                Err(e) => {
                    emit(
                        &events,
                        CompileEvent::Failed {
                            target: target.name(),
                            error: e.to_string(),
                        },
                    );
                    TaskStatus::Failed(e.to_string())
                }
            };
            TaskResult {
                target: target.name(),
                status,
            }
        })
        .collect();

    Ok(PhaseReport {
        results,
        disabled: 0,
    })
}

/// Compile one target if stale. Returns whether the artifact was written.
pub fn compile_target(
    target: &BuildTarget,
    include_dir: &Path,
    backend: &impl ToolBackend,
    cache: &MtimeCache,
) -> Result<bool, TargetError> {
    if !target.is_stale(cache) {
        return Ok(false);
    }
    let css = backend.compile(&CompileParams {
        include_dir: include_dir.to_path_buf(),
        theme_stylesheet: target.theme.stylesheet.clone(),
        site_stylesheet: target.site.stylesheet.clone(),
    })?;
    write_atomic(&target.output, &css)?;
    Ok(true)
}

fn emit(events: &Option<Sender<CompileEvent>>, event: CompileEvent) {
    if let Some(tx) = events {
        // The printer going away must not fail the build
        let _ = tx.send(event);
    }
}
