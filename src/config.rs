//! Project configuration module.
//!
//! Handles loading, validating, and merging `skinmake.toml`. The file is
//! optional: stock defaults describe the conventional layout, and a user file
//! overrides only the keys it names.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── skinmake.toml            # Optional overrides
//! ├── styl/                    # Shared includes (index.styl, mixins.styl)
//! ├── themes/                  # One directory per theme
//! ├── sites/                   # One stylesheet per site (+ optional .url)
//! ├── css/                     # Compiled artifacts (produced)
//! └── screenshots/             # Snapshot history worktree (produced)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! sites_dir = "sites"
//! themes_dir = "themes"
//! css_dir = "css"
//! screenshots_dir = "screenshots"
//!
//! [build]
//! extension = "styl"              # Stylesheet extension for themes and sites
//! support_file = "colors.styl"    # Shared by every variant of a theme
//! aggregate_site = "all-sites"    # Depends on every site's stylesheet
//! include_dir = "styl"            # Passed to the compiler as include path
//! common_deps = ["styl/index.styl", "styl/mixins.styl"]
//! compiler = ["stylus"]
//!
//! [screenshots]
//! command = ["phantomjs", "--ssl-protocol=any", "--ignore-ssl-errors=true", "screenshot.js"]
//! recompressor = ["pngcrush"]
//! branch = "screenshots"
//! commit_message = "Update screenshots"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! tool_timeout_secs = 300   # Kill an external tool after this long
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the optional config file in the project root.
pub const CONFIG_FILENAME: &str = "skinmake.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `skinmake.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Where sources live and where artifacts go.
    pub layout: LayoutConfig,
    /// Theme/site conventions and the compiler command.
    pub build: BuildConfig,
    /// Screenshot, recompression and history settings.
    pub screenshots: ScreenshotsConfig,
    /// Worker pool and tool timeout settings.
    pub processing: ProcessingConfig,
}

impl ProjectConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build.extension.is_empty() {
            return Err(ConfigError::Validation(
                "build.extension must not be empty".into(),
            ));
        }
        if self.build.compiler.is_empty() {
            return Err(ConfigError::Validation(
                "build.compiler must name a program".into(),
            ));
        }
        if self.screenshots.command.is_empty() {
            return Err(ConfigError::Validation(
                "screenshots.command must name a program".into(),
            ));
        }
        if self.screenshots.recompressor.is_empty() {
            return Err(ConfigError::Validation(
                "screenshots.recompressor must name a program".into(),
            ));
        }
        if self.processing.tool_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "processing.tool_timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub sites_dir: String,
    pub themes_dir: String,
    pub css_dir: String,
    pub screenshots_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sites_dir: "sites".to_string(),
            themes_dir: "themes".to_string(),
            css_dir: "css".to_string(),
            screenshots_dir: "screenshots".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Anchor every layout directory at `root`.
    pub fn resolve(&self, root: &Path) -> ProjectPaths {
        ProjectPaths {
            root: root.to_path_buf(),
            sites: root.join(&self.sites_dir),
            themes: root.join(&self.themes_dir),
            css: root.join(&self.css_dir),
            screenshots: root.join(&self.screenshots_dir),
        }
    }
}

/// Layout directories resolved against a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub sites: PathBuf,
    pub themes: PathBuf,
    pub css: PathBuf,
    pub screenshots: PathBuf,
}

/// Theme/site conventions and the compiler command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Extension (without dot) of variant and site stylesheets.
    pub extension: String,
    /// Filename inside a theme directory that is a support file, not a variant.
    pub support_file: String,
    /// Site whose artifact depends on every other site's stylesheet.
    pub aggregate_site: String,
    /// Include directory handed to the compiler.
    pub include_dir: String,
    /// Files every artifact depends on, relative to the project root.
    pub common_deps: Vec<String>,
    /// Compiler program and leading arguments.
    pub compiler: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            extension: "styl".to_string(),
            support_file: "colors.styl".to_string(),
            aggregate_site: "all-sites".to_string(),
            include_dir: "styl".to_string(),
            common_deps: vec!["styl/index.styl".to_string(), "styl/mixins.styl".to_string()],
            compiler: vec!["stylus".to_string()],
        }
    }
}

impl BuildConfig {
    /// Common dependency paths anchored at the project root.
    pub fn common_dep_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.common_deps.iter().map(|d| root.join(d)).collect()
    }
}

/// Screenshot capture, recompression and history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenshotsConfig {
    /// Screenshot program and leading arguments; `<url> <png> <css>` are appended.
    pub command: Vec<String>,
    /// Lossless recompressor; `<input> <output>` are appended.
    pub recompressor: Vec<String>,
    /// Branch holding the snapshot history.
    pub branch: String,
    /// Message of the single amended snapshot commit.
    pub commit_message: String,
}

impl Default for ScreenshotsConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "phantomjs".to_string(),
                "--ssl-protocol=any".to_string(),
                "--ignore-ssl-errors=true".to_string(),
                "screenshot.js".to_string(),
            ],
            recompressor: vec!["pngcrush".to_string()],
            branch: "screenshots".to_string(),
            commit_message: "Update screenshots".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
    /// Seconds an external tool may run before it is killed.
    pub tool_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: None,
            tool_timeout_secs: 300,
        }
    }
}

impl ProcessingConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ProjectConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `skinmake.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ProjectConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ProjectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the project config from `root`, falling back to stock defaults.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `skinmake.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# skinmake configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Layout (relative to the project root)
# ---------------------------------------------------------------------------
[layout]
sites_dir = "sites"
themes_dir = "themes"
css_dir = "css"
screenshots_dir = "screenshots"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Extension of theme variant and site stylesheets.
extension = "styl"

# File inside a theme directory shared by all of its variants.
support_file = "colors.styl"

# Site whose artifact is rebuilt whenever any site stylesheet changes.
aggregate_site = "all-sites"

# Include directory passed to the compiler.
include_dir = "styl"

# Files every artifact depends on.
common_deps = ["styl/index.styl", "styl/mixins.styl"]

# Compiler program. Invoked as:
#   <compiler> --include <include_dir> --import <theme> --import <include_dir> -p <site>
compiler = ["stylus"]

# ---------------------------------------------------------------------------
# Screenshots
# ---------------------------------------------------------------------------
[screenshots]
# Screenshot program. Invoked as: <command> <url> <png> <css>
command = ["phantomjs", "--ssl-protocol=any", "--ignore-ssl-errors=true", "screenshot.js"]

# Lossless recompressor. Invoked as: <recompressor> <input> <output>
recompressor = ["pngcrush"]

# Branch checked out in the screenshots directory.
branch = "screenshots"

# Message of the single, amended snapshot commit.
commit_message = "Update screenshots"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# Seconds an external tool may run before it is killed.
tool_timeout_secs = 300
"##
}
