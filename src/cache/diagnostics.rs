//! Warning side channel for best-effort cache operations
//!
//! Corrupt indexes and per-file migration failures never fail the caller.
//! They are reported here instead.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A recoverable problem observed while reading or maintaining the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheWarning {
    /// The index file exists but could not be read.
    IndexUnreadable { path: PathBuf, error: String },
    /// The index file could not be parsed; it is treated as empty.
    IndexCorrupt { path: PathBuf, error: String },
    /// A lookup hit could not be written back to the index.
    IndexRefreshFailed { digest: String, error: String },
    /// A loose file could not be read during migration.
    MigrationReadFailed { path: PathBuf, error: String },
    /// A loose file was migrated but could not be deleted.
    MigrationDeleteFailed { path: PathBuf, error: String },
    /// A file under the cache root does not follow the shard layout.
    UnrecognizedEntry { path: PathBuf },
}

impl fmt::Display for CacheWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexUnreadable { path, error } => {
                write!(f, "error reading cache index {}: {error}", path.display())
            }
            Self::IndexCorrupt { path, error } => {
                write!(f, "error decoding cache index {}: {error}", path.display())
            }
            Self::IndexRefreshFailed { digest, error } => {
                write!(f, "failed to refresh index entry {digest}: {error}")
            }
            Self::MigrationReadFailed { path, error } => {
                write!(f, "error reading file {}: {error}", path.display())
            }
            Self::MigrationDeleteFailed { path, error } => {
                write!(f, "error deleting file {}: {error}", path.display())
            }
            Self::UnrecognizedEntry { path } => {
                write!(f, "skipping file outside shard layout: {}", path.display())
            }
        }
    }
}

/// Receiver for [`CacheWarning`] events.
pub trait Diagnostics: Send + Sync {
    fn warn(&self, warning: CacheWarning);
}

/// Forwards warnings to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, warning: CacheWarning) {
        tracing::warn!(target: "ctcache", "{warning}");
    }
}

/// Keeps every warning in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    warnings: Mutex<Vec<CacheWarning>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<CacheWarning> {
        match self.warnings.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn warn(&self, warning: CacheWarning) {
        match self.warnings.lock() {
            Ok(mut guard) => guard.push(warning),
            Err(poisoned) => poisoned.into_inner().push(warning),
        }
    }
}

pub(crate) fn default_diagnostics() -> Arc<dyn Diagnostics> {
    Arc::new(TracingDiagnostics)
}
