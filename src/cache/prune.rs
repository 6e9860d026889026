//! Maintenance pass: fold loose files into the index and evict stale entries
//!
//! One call walks the sharded tree, moves every entry file into
//! `entries.json`, deletes the shard directories, drops entries unused for
//! longer than the retention window, and rewrites the index.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::cache::diagnostics::{default_diagnostics, CacheWarning, Diagnostics};
use crate::cache::facade::FsCache;
use crate::cache::index::{self, index_path, Entries, Entry, ENTRIES_FILE};
use crate::core::paths::digest_key_from_entry_path;
use crate::core::util::{get_mtime, now, TMP_MARKER};
use crate::error::CacheError;

/// Outcome of a prune pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub root: PathBuf,
    /// Loose files folded into the index
    pub migrated: usize,
    /// Files left alone because they could not be read or placed
    pub skipped: usize,
    /// Index entries considered for eviction
    pub scanned: usize,
    /// Entries dropped for being older than the window
    pub removed: usize,
    /// Entries written back
    pub kept: usize,
    pub retention_weeks: u32,
}

impl PruneReport {
    /// Human summary, one line per fact
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Found {} cache entries in {}",
            self.scanned,
            self.root.display()
        )];
        if self.removed == 0 {
            lines.push("No outdated entries".to_string());
        } else {
            lines.push(format!("Removed {} outdated cache entries", self.removed));
        }
        lines
    }
}

/// Runs prune passes against one cache root.
pub struct Pruner {
    root: PathBuf,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Pruner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            diagnostics: default_diagnostics(),
        }
    }

    /// Prune the same root, reporting to the same sink, as `cache`.
    pub fn for_cache(cache: &FsCache) -> Self {
        Self {
            root: cache.root().to_path_buf(),
            diagnostics: Arc::clone(cache.diagnostics()),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Prune with entries unused for more than `weeks` weeks evicted.
    pub fn prune(&self, weeks: u32) -> Result<PruneReport, CacheError> {
        self.prune_at(weeks, now())
    }

    /// [`Pruner::prune`] against a fixed clock.
    pub fn prune_at(&self, weeks: u32, now: DateTime<Utc>) -> Result<PruneReport, CacheError> {
        fs::create_dir_all(&self.root)?;
        let path = index_path(&self.root);

        let mut entries = index::load(&path, self.diagnostics.as_ref());
        let (migrated, skipped) = self.migrate_loose_files(&mut entries);
        self.remove_shard_dirs()?;

        let scanned = entries.len();
        let window = Duration::weeks(i64::from(weeks));
        entries.retain(|_, entry| now.signed_duration_since(entry.last_used) <= window);
        let kept = entries.len();

        let report = PruneReport {
            root: self.root.clone(),
            migrated,
            skipped,
            scanned,
            removed: scanned - kept,
            kept,
            retention_weeks: weeks,
        };
        tracing::info!(
            target: "ctcache",
            root = %self.root.display(),
            migrated,
            scanned,
            removed = report.removed,
            "pruned cache"
        );

        index::save(&path, &entries)?;
        Ok(report)
    }

    /// Move every entry file into `entries`, deleting each once it is in.
    /// Returns `(migrated, skipped)`.
    fn migrate_loose_files(&self, entries: &mut Entries) -> (usize, usize) {
        let mut migrated = 0;
        let mut skipped = 0;

        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(self.root.as_path()).to_path_buf();
                    self.diagnostics.warn(CacheWarning::MigrationReadFailed {
                        path,
                        error: err.to_string(),
                    });
                    skipped += 1;
                    continue;
                }
            };
            if entry.file_type().is_dir() || is_index_file(&self.root, entry.path()) {
                continue;
            }

            let path = entry.path();
            let Some(key) = digest_key_from_entry_path(&self.root, path) else {
                self.diagnostics.warn(CacheWarning::UnrecognizedEntry {
                    path: path.to_path_buf(),
                });
                skipped += 1;
                continue;
            };

            let loaded = fs::read(path).and_then(|content| Ok((content, get_mtime(path)?)));
            let (content, last_used) = match loaded {
                Ok(loaded) => loaded,
                Err(err) => {
                    self.diagnostics.warn(CacheWarning::MigrationReadFailed {
                        path: path.to_path_buf(),
                        error: err.to_string(),
                    });
                    skipped += 1;
                    continue;
                }
            };

            entries.insert(key, Entry::new(content, last_used));
            migrated += 1;

            if let Err(err) = fs::remove_file(path) {
                self.diagnostics.warn(CacheWarning::MigrationDeleteFailed {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                });
            }
        }

        (migrated, skipped)
    }

    /// Delete every top-level directory under the root. Any failure aborts.
    fn remove_shard_dirs(&self) -> Result<(), CacheError> {
        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() {
                continue;
            }
            let path = dir_entry.path();
            fs::remove_dir_all(&path).map_err(|source| CacheError::CleanupFailed {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// `entries.json` or one of its in-flight temp files at the root.
fn is_index_file(root: &Path, path: &Path) -> bool {
    if path.parent() != Some(root) {
        return false;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == ENTRIES_FILE
        || name
            .strip_prefix(ENTRIES_FILE)
            .is_some_and(|rest| rest.starts_with(TMP_MARKER))
}
