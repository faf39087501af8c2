//! Build target enumeration: the theme × site cross product.
//!
//! Each [`BuildTarget`] pairs one logical theme with one site and carries
//! everything the schedulers need: the artifact path and the dependency list
//! that decides staleness.
//!
//! ## Dependencies
//!
//! In order, possibly with repeats:
//!
//! 1. the common includes (`styl/index.styl`, `styl/mixins.styl`)
//! 2. the theme's variant stylesheet
//! 3. the theme's support files
//! 4. the site's stylesheet
//! 5. for the aggregate site only: every site's stylesheet
//!
//! Leaving a file out of this list means edits to it never trigger a rebuild,
//! so anything the compiler reads for a target belongs here.

use crate::cache::{MtimeCache, is_stale};
use crate::config::{BuildConfig, ProjectPaths};
use crate::naming::{artifact_file_name, target_name};
use crate::tools::ToolError;
use crate::types::{LogicalTheme, Site};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single compile or snapshot task.
#[derive(Error, Debug)]
pub enum TargetError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One (theme, site) combination and its compiled artifact.
#[derive(Debug, Clone, Serialize)]
pub struct BuildTarget {
    pub theme: LogicalTheme,
    pub site: Site,
    /// `<css_dir>/<theme>/<theme>-<site>.css`
    pub output: PathBuf,
    pub dependencies: Vec<PathBuf>,
}

impl BuildTarget {
    /// Display identity, e.g. `dark-a/home`.
    pub fn name(&self) -> String {
        target_name(&self.theme.name, &self.site.name)
    }

    /// Whether the artifact is older than any of its dependencies.
    pub fn is_stale(&self, cache: &MtimeCache) -> bool {
        is_stale(&self.output, &self.dependencies, cache)
    }

    /// Directory holding the artifact.
    pub fn output_dir(&self) -> &Path {
        self.output.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Build one target per (theme, site) pair, theme-major.
pub fn enumerate_targets(
    themes: &[LogicalTheme],
    sites: &[Site],
    paths: &ProjectPaths,
    config: &BuildConfig,
) -> Vec<BuildTarget> {
    let common = config.common_dep_paths(&paths.root);
    let common = common.as_slice();

    themes
        .iter()
        .flat_map(move |theme| {
            sites.iter().map(move |site| BuildTarget {
                theme: theme.clone(),
                site: site.clone(),
                output: paths
                    .css
                    .join(&theme.name)
                    .join(artifact_file_name(&theme.name, &site.name)),
                dependencies: dependencies(common, theme, site, sites, &config.aggregate_site),
            })
        })
        .collect()
}

/// Dependency list of one target (see the module docs for the order).
pub fn dependencies(
    common: &[PathBuf],
    theme: &LogicalTheme,
    site: &Site,
    all_sites: &[Site],
    aggregate_site: &str,
) -> Vec<PathBuf> {
    let mut deps = common.to_vec();
    deps.push(theme.stylesheet.clone());
    deps.extend(theme.support_files.iter().cloned());
    deps.push(site.stylesheet.clone());

    if site.name == aggregate_site {
        deps.extend(all_sites.iter().map(|s| s.stylesheet.clone()));
    }
    deps
}

/// Failure to create an artifact directory before fan-out.
#[derive(Error, Debug)]
#[error("Cannot create output directory {path}: {source}")]
pub struct OutputDirError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Distinct parent directories of `outputs`, sorted.
pub fn distinct_dirs<'a>(outputs: impl IntoIterator<Item = &'a Path>) -> Vec<PathBuf> {
    outputs
        .into_iter()
        .filter_map(|p| p.parent())
        .map(Path::to_path_buf)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Create the parent directory of every output, one at a time.
///
/// Schedulers call this before fanning out so no two workers race to create
/// the same directory.
pub fn create_output_dirs<'a>(
    outputs: impl IntoIterator<Item = &'a Path>,
) -> Result<(), OutputDirError> {
    for dir in distinct_dirs(outputs) {
        std::fs::create_dir_all(&dir).map_err(|source| OutputDirError {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}
