//! Theme discovery and variant identity resolution.
//!
//! ## Directory Structure
//!
//! ```text
//! themes/
//! ├── dark/                  # Two variants → themes "dark-a", "dark-b"
//! │   ├── a.styl
//! │   ├── b.styl
//! │   └── colors.styl        # Support file, shared by both variants
//! ├── plain/                 # One variant → theme "plain"
//! │   └── plain.styl
//! └── notes.txt              # Not a directory, ignored
//! ```
//!
//! Files that are neither the support file nor stylesheets are ignored. A
//! directory without variants contributes no theme.
//!
//! ## Errors
//!
//! Any unreadable directory aborts discovery: a partial theme catalog would
//! silently build fewer artifacts. Two directories resolving to the same
//! logical name (`dark/` with variant `a` next to `dark-a/`) are rejected for
//! the same reason, since their artifacts would overwrite each other.

use crate::config::BuildConfig;
use crate::naming::{logical_theme_name, stylesheet_stem};
use crate::types::LogicalTheme;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Cannot read themes root {0}: {1}")]
    Root(PathBuf, #[source] walkdir::Error),
    #[error("Cannot read theme directory {0}: {1}")]
    Directory(PathBuf, #[source] std::io::Error),
    #[error("Theme name '{0}' is produced by more than one theme directory")]
    DuplicateName(String),
}

/// Files of one theme directory, split by role.
#[derive(Debug, Default)]
struct ThemeFiles {
    /// `(variant, path)`, sorted by variant.
    variants: Vec<(String, PathBuf)>,
    support: Vec<PathBuf>,
}

/// Resolve every logical theme under `themes_root`.
///
/// Directories are visited in name order and variants in name order within a
/// directory, so the result is deterministic.
pub fn resolve_themes(
    themes_root: &Path,
    config: &BuildConfig,
) -> Result<Vec<LogicalTheme>, ThemeError> {
    let mut themes = Vec::new();

    let walker = WalkDir::new(themes_root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| ThemeError::Root(themes_root.to_path_buf(), e))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir_name = entry.file_name().to_string_lossy().to_string();
        if dir_name.starts_with('.') {
            continue;
        }

        let files = classify_theme_files(entry.path(), config)?;
        let count = files.variants.len();
        for (variant, stylesheet) in files.variants {
            themes.push(LogicalTheme {
                name: logical_theme_name(&dir_name, &variant, count),
                stylesheet,
                support_files: files.support.clone(),
            });
        }
    }

    check_unique_names(&themes)?;
    Ok(themes)
}

fn classify_theme_files(dir: &Path, config: &BuildConfig) -> Result<ThemeFiles, ThemeError> {
    let read_err = |e| ThemeError::Directory(dir.to_path_buf(), e);

    let mut files = ThemeFiles::default();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if entry.file_name() == config.support_file.as_str() {
            files.support.push(path);
        } else if let Some(variant) = stylesheet_stem(&path, &config.extension) {
            files.variants.push((variant, path));
        }
    }

    files.variants.sort();
    files.support.sort();
    Ok(files)
}

fn check_unique_names(themes: &[LogicalTheme]) -> Result<(), ThemeError> {
    let mut seen = BTreeSet::new();
    for theme in themes {
        if !seen.insert(theme.name.as_str()) {
            return Err(ThemeError::DuplicateName(theme.name.clone()));
        }
    }
    Ok(())
}
