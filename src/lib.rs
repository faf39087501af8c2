//! # skinmake
//!
//! Incremental builder for a matrix of user stylesheets. Every theme variant
//! is compiled against every site, only the combinations whose inputs changed
//! are rebuilt, and an optional second phase screenshots each combination
//! and archives the images as a single amended git commit.
//!
//! # Architecture: Two Ordered Phases
//!
//! ```text
//! discover   skinmake.toml, themes/, sites/  →  BuildTarget matrix
//! compile    stale targets                   →  css/<theme>/<theme>-<site>.css
//! snapshot   stale snapshots                 →  screenshots/<theme>/<site>.png
//!                                            →  amended commit on `screenshots`
//! ```
//!
//! Each phase fans its targets out over a rayon pool. Targets never read each
//! other's outputs, so tasks within a phase run in any order; the snapshot
//! phase only starts once compilation has fully settled.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `skinmake.toml` loading, merging onto stock defaults, validation |
//! | [`project`] | One-step discovery of the catalog and target matrix |
//! | [`themes`] | Theme directories → logical themes (variant naming rule) |
//! | [`sites`] | Site stylesheets and screenshot URL resolution |
//! | [`targets`] | Theme × site cross product and per-target dependency lists |
//! | [`cache`] | Memoized mtimes and the staleness rule |
//! | [`compile`] | Parallel compile scheduler |
//! | [`snapshot`] | Parallel screenshot scheduler |
//! | [`archive`] | Snapshot history as a git worktree with one amended commit |
//! | [`tools`] | External compiler, screenshot and recompressor invocation |
//! | [`atomic`] | Replace-on-success file writes |
//! | [`report`] | Per-task outcomes and phase summaries |
//! | [`naming`] | Naming conventions shared by every module |
//! | [`types`] | Catalog types (`LogicalTheme`, `Site`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Timestamps, Not Hashes
//!
//! Staleness is decided purely by comparing modification times: an artifact
//! is rebuilt when any dependency is strictly newer. There is no manifest to
//! keep in sync with the tree, and touching a file is always enough to force
//! a rebuild. Dependencies are exactly one level deep; the compiler's own
//! imports beyond the listed files are not tracked.
//!
//! ## External Tools Behind a Trait
//!
//! The stylesheet compiler, the headless browser and the PNG recompressor are
//! black boxes behind [`tools::ToolBackend`]. Production spawns processes with
//! a timeout; tests substitute a recording mock, so scheduling logic is tested
//! without any of those programs installed.
//!
//! ## Failures Stay Per Target
//!
//! A failing compile or capture is recorded and its siblings carry on. The
//! previous artifact is left in place because outputs are only ever replaced
//! by a completed file. Any failure still makes the run exit non-zero.

pub mod archive;
pub mod atomic;
pub mod cache;
pub mod compile;
pub mod config;
pub mod naming;
pub mod output;
pub mod project;
pub mod report;
pub mod sites;
pub mod snapshot;
pub mod targets;
pub mod themes;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
