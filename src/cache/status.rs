//! Read-only snapshot of a cache root

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::cache::facade::FsCache;
use crate::cache::index::{self, index_path};
use crate::core::paths::digest_key_from_entry_path;
use crate::error::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub root: PathBuf,
    pub root_exists: bool,
    /// Entries in `entries.json`
    pub index_entries: usize,
    /// Entry files still waiting for a prune
    pub loose_files: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_last_used: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_last_used: Option<DateTime<Utc>>,
}

impl CacheStatus {
    pub fn summary(&self) -> String {
        format!(
            "{} index entries, {} loose files in {}",
            self.index_entries,
            self.loose_files,
            self.root.display()
        )
    }
}

/// Inspect the cache without modifying it.
pub fn collect_status(cache: &FsCache) -> Result<CacheStatus, CacheError> {
    let root = cache.root();
    if !root.exists() {
        return Ok(CacheStatus {
            root: root.to_path_buf(),
            root_exists: false,
            index_entries: 0,
            loose_files: 0,
            oldest_last_used: None,
            newest_last_used: None,
        });
    }

    let entries = index::load(&index_path(root), cache.diagnostics().as_ref());
    let oldest_last_used = entries.values().map(|e| e.last_used).min();
    let newest_last_used = entries.values().map(|e| e.last_used).max();

    let mut loose_files = 0;
    for entry in WalkDir::new(root).min_depth(3).max_depth(3) {
        let entry = entry?;
        if entry.file_type().is_file() && digest_key_from_entry_path(root, entry.path()).is_some()
        {
            loose_files += 1;
        }
    }

    Ok(CacheStatus {
        root: root.to_path_buf(),
        root_exists: true,
        index_entries: entries.len(),
        loose_files,
        oldest_last_used,
        newest_last_used,
    })
}
