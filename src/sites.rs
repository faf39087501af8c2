//! Site discovery and screenshot URL resolution.
//!
//! ```text
//! sites/
//! ├── home.styl              # Site "home", screenshot http://home
//! ├── github.com.styl        # Site "github.com", URL from the .url file
//! ├── github.com.url         #   first line: https://github.com/explore
//! ├── intranet.styl          # Site "intranet", screenshots disabled
//! └── intranet.url           #   empty
//! ```
//!
//! Only files directly under the sites root are considered.

use crate::naming::{default_site_url, stylesheet_stem};
use crate::types::Site;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Cannot read sites root {0}: {1}")]
    Root(PathBuf, #[source] io::Error),
    #[error("Cannot read URL override {0}: {1}")]
    Url(PathBuf, #[source] io::Error),
}

/// Resolve every site under `sites_root`, sorted by name.
pub fn resolve_sites(sites_root: &Path, extension: &str) -> Result<Vec<Site>, SiteError> {
    let root_err = |e| SiteError::Root(sites_root.to_path_buf(), e);

    let mut sites = Vec::new();
    for entry in fs::read_dir(sites_root).map_err(root_err)? {
        let path = entry.map_err(root_err)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = stylesheet_stem(&path, extension) else {
            continue;
        };
        let url = resolve_url(sites_root, &name)?;
        sites.push(Site {
            name,
            stylesheet: path,
            url,
        });
    }

    sites.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sites)
}

/// Screenshot URL of a site.
///
/// - no `<name>.url` file → `http://<name>`
/// - first line non-blank → that line, trimmed
/// - file empty or first line blank → `None` (screenshots disabled)
pub fn resolve_url(sites_root: &Path, name: &str) -> Result<Option<String>, SiteError> {
    let url_path = sites_root.join(format!("{name}.url"));
    let content = match fs::read_to_string(&url_path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Some(default_site_url(name)));
        }
        Err(e) => return Err(SiteError::Url(url_path, e)),
    };
    let first = content.lines().next().unwrap_or("").trim();
    Ok((!first.is_empty()).then(|| first.to_string()))
}
