//! Catalog discovery: config, themes, sites and the target matrix in one step.
//!
//! Discovery is all-or-nothing. An unreadable themes or sites root aborts the
//! run instead of yielding a partial catalog, since a missing theme would
//! silently drop every one of its targets.

use crate::config::{ConfigError, ProjectConfig, ProjectPaths, load_config};
use crate::sites::{SiteError, resolve_sites};
use crate::targets::{BuildTarget, enumerate_targets};
use crate::themes::{ThemeError, resolve_themes};
use crate::types::{LogicalTheme, Site};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error(transparent)]
    Site(#[from] SiteError),
}

/// Everything resolved from a project directory before any phase runs.
#[derive(Debug, Clone)]
pub struct Project {
    pub config: ProjectConfig,
    pub paths: ProjectPaths,
    pub themes: Vec<LogicalTheme>,
    pub sites: Vec<Site>,
    pub targets: Vec<BuildTarget>,
}

impl Project {
    /// Load `skinmake.toml` (if any) from `root` and resolve the catalog.
    pub fn discover(root: &Path) -> Result<Self, ProjectError> {
        let config = load_config(root)?;
        Self::with_config(root, config)
    }

    /// Resolve the catalog under an already loaded configuration.
    pub fn with_config(root: &Path, config: ProjectConfig) -> Result<Self, ProjectError> {
        let paths = config.layout.resolve(root);
        let themes = resolve_themes(&paths.themes, &config.build)?;
        let sites = resolve_sites(&paths.sites, &config.build.extension)?;
        let targets = enumerate_targets(&themes, &sites, &paths, &config.build);
        Ok(Self {
            config,
            paths,
            themes,
            sites,
            targets,
        })
    }

    /// Directory passed to the compiler as both include path and import.
    pub fn include_dir(&self) -> std::path::PathBuf {
        self.paths.root.join(&self.config.build.include_dir)
    }
}
