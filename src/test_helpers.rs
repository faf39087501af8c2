//! Shared test utilities for the skinmake test suite.
//!
//! Provides a builder for throwaway project trees, mtime control, and lookup
//! helpers that panic with the available names when something is missing.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fixture = ProjectFixture::new()
//!     .theme("dark", &["a", "b"], true)
//!     .site("home", None)
//!     .site("intranet", Some(""));
//!
//! let targets = fixture.targets();
//! let t = find_target(&targets, "dark-a/home");
//! touch_at(&t.output, 2_000);
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

use crate::config::{BuildConfig, LayoutConfig, ProjectPaths};
use crate::sites::resolve_sites;
use crate::targets::{BuildTarget, enumerate_targets};
use crate::themes::resolve_themes;
use crate::types::{LogicalTheme, Site};

/// Mtime given to every file a [`ProjectFixture`] writes.
pub const FIXTURE_MTIME: u64 = 1_000;

// =========================================================================
// Files and mtimes
// =========================================================================

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Set the mtime of `path` to `secs` after the epoch, creating it if missing.
///
/// Tests pin mtimes explicitly instead of sleeping so staleness checks do not
/// depend on filesystem timestamp granularity.
pub fn touch_at(path: &Path, secs: u64) {
    if !path.exists() {
        write_file(path, "");
    }
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

// =========================================================================
// Project fixture
// =========================================================================

/// A project tree in a temp directory, built up with chained calls.
///
/// Always contains the common includes `styl/index.styl` and
/// `styl/mixins.styl`. Every file is written with mtime [`FIXTURE_MTIME`].
pub struct ProjectFixture {
    tmp: TempDir,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    pub fn new() -> Self {
        let fixture = Self {
            tmp: TempDir::new().unwrap(),
        };
        fixture.write("styl/index.styl", "@import 'mixins'\n");
        fixture.write("styl/mixins.styl", "rounded()\n  border-radius 3px\n");
        fixture
    }

    /// Add `themes/<dir>/` with one stylesheet per variant, plus
    /// `colors.styl` when `with_colors` is set.
    pub fn theme(self, dir: &str, variants: &[&str], with_colors: bool) -> Self {
        for variant in variants {
            self.write(
                &format!("themes/{dir}/{variant}.styl"),
                &format!("// {dir} {variant}\n"),
            );
        }
        if with_colors {
            self.write(&format!("themes/{dir}/colors.styl"), "bg = #222\n");
        }
        self
    }

    /// Add `sites/<name>.styl`, plus `sites/<name>.url` holding `url_file`
    /// when given.
    pub fn site(self, name: &str, url_file: Option<&str>) -> Self {
        self.write(&format!("sites/{name}.styl"), &format!("// {name}\n"));
        if let Some(content) = url_file {
            self.write(&format!("sites/{name}.url"), content);
        }
        self
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    /// Project paths under the stock layout.
    pub fn paths(&self) -> ProjectPaths {
        LayoutConfig::default().resolve(self.tmp.path())
    }

    /// Themes, sites and targets as the stock configuration resolves them.
    pub fn targets(&self) -> Vec<BuildTarget> {
        let paths = self.paths();
        let config = BuildConfig::default();
        let themes = resolve_themes(&paths.themes, &config).unwrap();
        let sites = resolve_sites(&paths.sites, &config.extension).unwrap();
        enumerate_targets(&themes, &sites, &paths, &config)
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        write_file(&path, content);
        touch_at(&path, FIXTURE_MTIME);
    }
}

// =========================================================================
// Lookup helpers
// =========================================================================

/// Find a theme by name. Panics with the available names if not found.
pub fn find_theme<'a>(themes: &'a [LogicalTheme], name: &str) -> &'a LogicalTheme {
    themes.iter().find(|t| t.name == name).unwrap_or_else(|| {
        panic!("theme '{name}' not found in {:?}", theme_names(themes));
    })
}

/// Find a site by name. Panics with the available names if not found.
pub fn find_site<'a>(sites: &'a [Site], name: &str) -> &'a Site {
    sites.iter().find(|s| s.name == name).unwrap_or_else(|| {
        panic!("site '{name}' not found in {:?}", site_names(sites));
    })
}

/// Find a target by `theme/site` name. Panics with the available names if not found.
pub fn find_target<'a>(targets: &'a [BuildTarget], name: &str) -> &'a BuildTarget {
    targets.iter().find(|t| t.name() == name).unwrap_or_else(|| {
        panic!("target '{name}' not found in {:?}", target_names(targets));
    })
}

pub fn theme_names(themes: &[LogicalTheme]) -> Vec<&str> {
    themes.iter().map(|t| t.name.as_str()).collect()
}

pub fn site_names(sites: &[Site]) -> Vec<&str> {
    sites.iter().map(|s| s.name.as_str()).collect()
}

pub fn target_names(targets: &[BuildTarget]) -> Vec<String> {
    targets.iter().map(BuildTarget::name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Mtime;

    #[test]
    fn touch_at_creates_and_pins_mtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a/b.styl");
        touch_at(&path, 42);
        assert_eq!(
            std::fs::metadata(&path).unwrap().modified().unwrap(),
            UNIX_EPOCH + Duration::from_secs(42)
        );
        assert!(!Mtime::of(&path).is_zero());
    }

    #[test]
    fn fixture_writes_common_includes() {
        let fixture = ProjectFixture::new();
        assert!(fixture.path("styl/index.styl").is_file());
        assert!(fixture.path("styl/mixins.styl").is_file());
    }

    #[test]
    #[should_panic(expected = "not found in")]
    fn find_target_panics_with_names() {
        let fixture = ProjectFixture::new()
            .theme("plain", &["plain"], false)
            .site("home", None);
        find_target(&fixture.targets(), "plain/nope");
    }
}
