//! Centralized filename conventions for themes, sites and artifacts.
//!
//! Every stage derives names through these functions so that the resolvers,
//! the target enumerator and the output formatter agree on identity:
//!
//! - `themes/dark/a.styl` + `themes/dark/b.styl` → themes `dark-a`, `dark-b`
//! - `themes/plain/plain.styl` (only variant) → theme `plain`
//! - `sites/home.styl` → site `home`
//! - theme `dark-a` × site `home` → `css/dark-a/dark-a-home.css`,
//!   `screenshots/dark-a/home.png`, target name `dark-a/home`

use std::path::Path;

/// Return the stem of `file` when it carries the stylesheet `extension`.
///
/// - `"home.styl"` with `"styl"` → `Some("home")`
/// - `"home.url"` with `"styl"` → `None`
/// - `".styl"` with `"styl"` → `None` (hidden file, no stem)
pub fn stylesheet_stem(file: &Path, extension: &str) -> Option<String> {
    let ext = file.extension()?.to_str()?;
    if ext != extension {
        return None;
    }
    let stem = file.file_stem()?.to_str()?;
    if stem.is_empty() || stem.starts_with('.') {
        return None;
    }
    Some(stem.to_string())
}

/// Name of a logical theme.
///
/// A lone variant inherits the directory name; siblings are disambiguated as
/// `<dir>-<variant>`.
pub fn logical_theme_name(dir: &str, variant: &str, variant_count: usize) -> String {
    if variant_count == 1 {
        dir.to_string()
    } else {
        format!("{dir}-{variant}")
    }
}

/// Compiled artifact filename for a (theme, site) pair.
///
/// Underscores framing the site name are dropped: `_admin_` → `admin`.
pub fn artifact_file_name(theme: &str, site: &str) -> String {
    format!("{}-{}.css", theme, site.trim_matches('_'))
}

/// Snapshot image filename for a site.
pub fn snapshot_file_name(site: &str) -> String {
    format!("{site}.png")
}

/// Display identity of a (theme, site) pair.
pub fn target_name(theme: &str, site: &str) -> String {
    format!("{theme}/{site}")
}

/// Default screenshot URL of a site without an override file.
pub fn default_site_url(site: &str) -> String {
    format!("http://{site}")
}
