//! ctcache - a content-addressed, disk-backed cache for analysis results
//!
//! Artifacts are keyed by a caller-supplied digest and stored in two tiers:
//! - a sharded tree of raw files (`root/ab/cd/ef...`) written on save
//! - a consolidated `entries.json` index consulted first on lookup
//!
//! [`Pruner`] moves loose files into the index and evicts entries that have
//! not been used within a retention window.

pub mod cache;
pub mod config;
pub mod core;
pub mod error;

pub use cache::diagnostics::{CacheWarning, Diagnostics, RecordingDiagnostics, TracingDiagnostics};
pub use cache::facade::{FsCache, Hit};
pub use cache::index::{Entries, Entry, ENTRIES_FILE};
pub use cache::prune::{PruneReport, Pruner};
pub use cache::status::{collect_status, CacheStatus};
pub use config::{CacheConfig, CACHE_DIR_ENV};
pub use crate::core::digest::Digest;
pub use error::{CacheError, Result};
