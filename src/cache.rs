//! Modification-time cache and the staleness rule for incremental builds.
//!
//! Incrementality is pure timestamp ordering: an artifact is rebuilt when any
//! file it depends on was modified after it. There is no hashing and no
//! persisted manifest, so the only state is the filesystem itself.
//!
//! # Design
//!
//! Dependency sets overlap heavily (every target lists the common includes,
//! every target of a theme lists its stylesheet), so each path is stat'ed at
//! most once per [`MtimeCache`]. The cache is an explicit object owned by one
//! phase of one run and shared by reference across rayon workers; it is never
//! invalidated. A phase that must observe files written by an earlier phase
//! creates a fresh cache.
//!
//! Missing paths (and anything that is not a regular file) map to
//! [`Mtime::ZERO`], which is older than every real timestamp. That makes
//! "output absent" stale as soon as one dependency exists, while a target
//! whose dependencies are all absent too is left alone: there is nothing to
//! build from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// A file's last-modified time, or [`Mtime::ZERO`] when it does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mtime(SystemTime);

impl Mtime {
    /// Sentinel for absent files.
    pub const ZERO: Mtime = Mtime(UNIX_EPOCH);

    /// Read the mtime of `path` straight from the filesystem.
    pub fn of(path: &Path) -> Mtime {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta.modified().map(Mtime).unwrap_or(Mtime::ZERO),
            _ => Mtime::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Mtime::ZERO
    }
}

/// Memoized mtime lookups for one phase of a run.
///
/// Safe to share across worker threads: lookups take a read lock, and the
/// write lock is held only to record a freshly stat'ed path.
#[derive(Debug, Default)]
pub struct MtimeCache {
    entries: RwLock<HashMap<PathBuf, Mtime>>,
}

impl MtimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modification time of `path`, stat'ing it on first use only.
    pub fn mtime(&self, path: &Path) -> Mtime {
        if let Some(m) = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
        {
            return *m;
        }
        let m = Mtime::of(path);
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(path.to_path_buf())
            .or_insert(m);
        m
    }

    /// Newest mtime among `paths`, or [`Mtime::ZERO`] for an empty set.
    pub fn newest<'a>(&self, paths: impl IntoIterator<Item = &'a PathBuf>) -> Mtime {
        paths
            .into_iter()
            .map(|p| self.mtime(p))
            .max()
            .unwrap_or(Mtime::ZERO)
    }

    /// Number of distinct paths stat'ed so far.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// True iff some dependency is strictly newer than `output`.
pub fn is_stale(output: &Path, deps: &[PathBuf], cache: &MtimeCache) -> bool {
    cache.newest(deps) > cache.mtime(output)
}
