//! Shared types produced by the resolvers and consumed by every later stage.
//!
//! All of them are computed once per run and never mutated afterwards. They
//! serialize to JSON for `skinmake targets --json`.

use serde::Serialize;
use std::path::PathBuf;

/// A theme as seen by the build: one variant of a theme directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalTheme {
    /// Unique across a run; used in every output path.
    pub name: String,
    /// Variant stylesheet handed to the compiler.
    pub stylesheet: PathBuf,
    /// Shared files of the theme directory (e.g. `colors.styl`).
    pub support_files: Vec<PathBuf>,
}

/// A site whose stylesheet is combined with every theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Site {
    pub name: String,
    pub stylesheet: PathBuf,
    /// Page to screenshot. `None` disables screenshots for this site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
