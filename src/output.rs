//! CLI output formatting for both phases and the target listing.
//!
//! # Information-First Display
//!
//! The primary display for every entity (theme, site, target) is its
//! identity, with filesystem paths shown as secondary context: either after
//! a `→` or on indented `Source:` lines. Paths are shown relative to the
//! project root.
//!
//! # Output Format
//!
//! ## Targets
//!
//! ```text
//! Themes
//! 001 dark-a
//!     Source: themes/dark/a.styl
//!     Support: themes/dark/colors.styl
//!
//! Sites
//! 001 home
//!     Source: sites/home.styl
//!     URL: http://home
//! 002 intranet
//!     Source: sites/intranet.styl
//!     URL: disabled
//!
//! Targets
//! 001 dark-a/home → css/dark-a/dark-a-home.css (stale)
//! 002 dark-a/intranet → css/dark-a/dark-a-intranet.css
//! ```
//!
//! ## Build
//!
//! ```text
//! Compiling 4 targets (8 workers)
//!     dark-a/home → css/dark-a/dark-a-home.css
//!     dark-b/home FAILED
//!         Error: `stylus` failed with exit status: 1: ParseError
//! Compile: 1 built, 2 up to date, 1 failed
//! ```
//!
//! ## Screenshots
//!
//! ```text
//! Capturing 3 snapshots, 1 disabled (8 workers)
//!     dark-a/home → screenshots/dark-a/home.png
//! Archived screenshots
//! Snapshots: 1 built, 2 up to date, 1 disabled
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects. Staleness in the listing is computed by the caller.

use crate::compile::CompileEvent;
use crate::report::PhaseReport;
use crate::snapshot::SnapshotEvent;
use crate::targets::BuildTarget;
use crate::types::{LogicalTheme, Site};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` when it lies inside it, unchanged otherwise.
fn rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// A failed task: identity first, the error on an indented context line.
fn failure_lines(target: &str, error: &str) -> Vec<String> {
    vec![
        format!("{}{} FAILED", indent(1), target),
        format!("{}Error: {}", indent(2), error),
    ]
}

// ============================================================================
// Target listing
// ============================================================================

/// A target and whether it currently needs rebuilding.
pub struct TargetState<'a> {
    pub target: &'a BuildTarget,
    pub stale: bool,
}

/// Format the resolved project: themes, sites, and the target matrix.
pub fn format_target_list(
    themes: &[LogicalTheme],
    sites: &[Site],
    targets: &[TargetState<'_>],
    root: &Path,
) -> Vec<String> {
    let mut lines = vec!["Themes".to_string()];
    for (i, theme) in themes.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), theme.name));
        lines.push(format!("{}Source: {}", indent(1), rel(&theme.stylesheet, root)));
        for support in &theme.support_files {
            lines.push(format!("{}Support: {}", indent(1), rel(support, root)));
        }
    }

    lines.push(String::new());
    lines.push("Sites".to_string());
    for (i, site) in sites.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), site.name));
        lines.push(format!("{}Source: {}", indent(1), rel(&site.stylesheet, root)));
        lines.push(format!(
            "{}URL: {}",
            indent(1),
            site.url.as_deref().unwrap_or("disabled")
        ));
    }

    lines.push(String::new());
    lines.push("Targets".to_string());
    for (i, state) in targets.iter().enumerate() {
        let marker = if state.stale { " (stale)" } else { "" };
        lines.push(format!(
            "{} {} → {}{}",
            format_index(i + 1),
            state.target.name(),
            rel(&state.target.output, root),
            marker
        ));
    }
    lines
}

/// Print the target listing to stdout.
pub fn print_target_list(
    themes: &[LogicalTheme],
    sites: &[Site],
    targets: &[TargetState<'_>],
    root: &Path,
) {
    for line in format_target_list(themes, sites, targets, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Compile phase
// ============================================================================

/// Format a single compile progress event as display lines.
pub fn format_compile_event(event: &CompileEvent, root: &Path) -> Vec<String> {
    match event {
        CompileEvent::Started { targets, workers } => {
            vec![format!(
                "Compiling {} ({})",
                plural(*targets, "target"),
                plural(*workers, "worker")
            )]
        }
        CompileEvent::Compiled { target, output } => {
            vec![format!("{}{} → {}", indent(1), target, rel(output, root))]
        }
        CompileEvent::Failed { target, error } => failure_lines(target, error),
    }
}

// ============================================================================
// Snapshot phase
// ============================================================================

/// Format a single snapshot progress event as display lines.
pub fn format_snapshot_event(event: &SnapshotEvent, root: &Path) -> Vec<String> {
    match event {
        SnapshotEvent::Started {
            targets,
            disabled,
            workers,
        } => {
            let mut header = format!("Capturing {}", plural(*targets, "snapshot"));
            if *disabled > 0 {
                header.push_str(&format!(", {disabled} disabled"));
            }
            vec![format!("{header} ({})", plural(*workers, "worker"))]
        }
        SnapshotEvent::Captured { target, output } => {
            vec![format!("{}{} → {}", indent(1), target, rel(output, root))]
        }
        SnapshotEvent::Failed { target, error } => failure_lines(target, error),
        SnapshotEvent::Archived { dir } => vec![format!("Archived {}", rel(dir, root))],
    }
}

// ============================================================================
// Phase summaries
// ============================================================================

/// One-line phase summary, e.g. `Compile: 2 built, 2 up to date`.
pub fn format_phase_summary(label: &str, report: &PhaseReport) -> String {
    format!("{label}: {report}")
}

/// Failures of a phase, one block per target, for stderr.
pub fn format_failures(label: &str, report: &PhaseReport) -> Vec<String> {
    if report.is_success() {
        return Vec::new();
    }
    let mut lines = vec![format!("{label} failures:")];
    for (target, error) in report.failures() {
        lines.push(format!("{}{}", indent(1), target));
        lines.push(format!("{}{}", indent(2), error));
    }
    lines
}

/// Print the summary to stdout and any failures to stderr.
pub fn print_phase_summary(label: &str, report: &PhaseReport) {
    println!("{}", format_phase_summary(label, report));
    for line in format_failures(label, report) {
        eprintln!("{}", line);
    }
}
