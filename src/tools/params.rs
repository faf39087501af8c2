//! Parameter types for external tool invocations.
//!
//! These structs describe *what* to run a tool on. Each one also knows the
//! argument list its tool expects, so the argv layout can be tested without
//! spawning anything and every backend agrees on it.
//!
//! - [`CompileParams`]: include directory, theme stylesheet, site stylesheet.
//! - [`ScreenshotParams`]: page URL, PNG output, stylesheet injected into the page.
//! - [`RecompressParams`]: input PNG and where to write the recompressed copy.

use std::ffi::OsString;
use std::path::PathBuf;

/// Inputs of one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileParams {
    pub include_dir: PathBuf,
    pub theme_stylesheet: PathBuf,
    pub site_stylesheet: PathBuf,
}

impl CompileParams {
    /// `--include <inc> --import <theme> --import <inc> -p <site>`
    ///
    /// The theme is imported before the include directory so its variables
    /// are defined when the shared includes are evaluated; `-p` prints the
    /// result to stdout.
    pub fn args(&self) -> Vec<OsString> {
        vec![
            "--include".into(),
            self.include_dir.clone().into(),
            "--import".into(),
            self.theme_stylesheet.clone().into(),
            "--import".into(),
            self.include_dir.clone().into(),
            "-p".into(),
            self.site_stylesheet.clone().into(),
        ]
    }
}

/// Inputs of one screenshot capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotParams {
    pub url: String,
    pub output: PathBuf,
    /// Compiled artifact applied to the page before capture.
    pub stylesheet: PathBuf,
}

impl ScreenshotParams {
    /// `<url> <output> <stylesheet>`
    pub fn args(&self) -> Vec<OsString> {
        vec![
            self.url.clone().into(),
            self.output.clone().into(),
            self.stylesheet.clone().into(),
        ]
    }
}

/// Inputs of one recompression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecompressParams {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl RecompressParams {
    /// `<input> <output>`
    pub fn args(&self) -> Vec<OsString> {
        vec![self.input.clone().into(), self.output.clone().into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_args_layout() {
        let params = CompileParams {
            include_dir: "styl".into(),
            theme_stylesheet: "themes/dark/a.styl".into(),
            site_stylesheet: "sites/home.styl".into(),
        };
        assert_eq!(
            params.args(),
            vec![
                "--include",
                "styl",
                "--import",
                "themes/dark/a.styl",
                "--import",
                "styl",
                "-p",
                "sites/home.styl"
            ]
        );
    }

    #[test]
    fn screenshot_args_layout() {
        let params = ScreenshotParams {
            url: "https://example.com".into(),
            output: "screenshots/dark/home.png".into(),
            stylesheet: "css/dark/dark-home.css".into(),
        };
        assert_eq!(
            params.args(),
            vec![
                "https://example.com",
                "screenshots/dark/home.png",
                "css/dark/dark-home.css"
            ]
        );
    }

    #[test]
    fn recompress_args_layout() {
        let params = RecompressParams {
            input: "a.png".into(),
            output: "b.png".into(),
        };
        assert_eq!(params.args(), vec!["a.png", "b.png"]);
    }
}
