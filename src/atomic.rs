//! Replace-on-success file writes.
//!
//! Artifacts and snapshots are produced next to their destination under a
//! temporary name and renamed over it once complete, so a reader (or a
//! crashed run) never sees a half-written file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

/// Name prefix of every file reserved by [`temp_beside`].
pub const TEMP_PREFIX: &str = ".skinmake-";

/// Write `bytes` to `path` atomically.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(parent_of(path))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    make_shareable(tmp.path())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Reserve a temporary path beside `path` with the given suffix.
///
/// The file is removed when the returned [`TempPath`] is dropped unless it
/// is persisted with [`replace_with`].
pub fn temp_beside(path: &Path, suffix: &str) -> io::Result<TempPath> {
    Ok(tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(suffix)
        .tempfile_in(parent_of(path))?
        .into_temp_path())
}

/// Move a finished temporary file over `path`.
pub fn replace_with(tmp: TempPath, path: &Path) -> io::Result<()> {
    make_shareable(&tmp)?;
    tmp.persist(path).map_err(|e| e.error)
}

/// Remove temporary files an interrupted run left in `dir`.
///
/// Returns how many were removed.
pub fn sweep_temp_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let leftover = entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX)
            && entry.file_type()?.is_file();
        if leftover {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Temp files are created owner-only; artifacts are meant to be served.
#[cfg(unix)]
fn make_shareable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn make_shareable(_path: &Path) -> io::Result<()> {
    Ok(())
}
