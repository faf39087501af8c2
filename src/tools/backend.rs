//! External tool backend trait and shared error type.
//!
//! The [`ToolBackend`] trait defines the three operations the schedulers
//! need: compile, screenshot and recompress. The production implementation is
//! [`CommandBackend`](super::command_backend::CommandBackend), which spawns
//! the configured programs. Tests substitute a recording mock.

use super::params::{CompileParams, RecompressParams, ScreenshotParams};
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` failed with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{0}` timed out after {1:?}")]
    Timeout(String, Duration),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for tool backends.
///
/// Implementations must be `Sync`: one backend is shared by every worker.
pub trait ToolBackend: Sync {
    /// Compile a (theme, site) pair and return the artifact bytes.
    fn compile(&self, params: &CompileParams) -> Result<Vec<u8>, ToolError>;

    /// Capture `params.url` with the stylesheet applied into `params.output`.
    fn screenshot(&self, params: &ScreenshotParams) -> Result<(), ToolError>;

    /// Write a losslessly recompressed copy of `params.input` to `params.output`.
    fn recompress(&self, params: &RecompressParams) -> Result<(), ToolError>;
}
