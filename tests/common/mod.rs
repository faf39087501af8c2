//! Helpers shared by the integration tests.
//!
//! Every test gets its own copy of `fixtures/project/` and drives the real
//! binary against it. External tools are replaced by small `sh` scripts
//! configured through `skinmake.toml`.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Stand-in compiler: echoes its arguments as a CSS comment and fails for
/// any site stylesheet named `broken.styl`.
pub const FAKE_COMPILER: &str = r#"compiler = ['sh', '-c', 'case "$*" in *broken.styl*) echo "ParseError: unexpected }" >&2; exit 1;; esac; printf "/* %s */\n" "$*"', 'stylus']"#;

/// Stand-in screenshotter: writes the URL into the image path.
pub const FAKE_SCREENSHOT: &str = r#"command = ['sh', '-c', 'printf "%s\n" "$1" > "$2"', 'shot']"#;

/// Stand-in recompressor.
pub const FAKE_RECOMPRESSOR: &str = "recompressor = ['cp']";

/// Copy `fixtures/project/` to a temp directory and configure fake tools.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    std::fs::write(
        tmp.path().join("skinmake.toml"),
        format!("[build]\n{FAKE_COMPILER}\n\n[screenshots]\n{FAKE_SCREENSHOT}\n{FAKE_RECOMPRESSOR}\n"),
    )
    .unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Run the skinmake binary against `project`.
pub fn skinmake(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_skinmake"))
        .arg("--project")
        .arg(project)
        .args(args)
        .output()
        .expect("failed to run skinmake")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Push the mtime of `path` into the future so it is newer than any output.
pub fn touch_later(path: &Path) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();
}

pub fn artifact(project: &Path, theme: &str, site: &str) -> PathBuf {
    project
        .join("css")
        .join(theme)
        .join(format!("{theme}-{site}.css"))
}
