//! Public lookup/save surface over both tiers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::diagnostics::{default_diagnostics, CacheWarning, Diagnostics};
use crate::cache::index::{self, index_path, Entry};
use crate::cache::sharded;
use crate::config::CacheConfig;
use crate::core::digest::Digest;
use crate::core::model::Tier;
use crate::core::paths::resolve;
use crate::core::util::now;
use crate::error::CacheError;

/// A successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub content: Vec<u8>,
    pub tier: Tier,
}

/// Filesystem cache rooted at a single directory.
///
/// Holds no entry state between calls; every operation goes back to disk.
pub struct FsCache {
    root: PathBuf,
    diagnostics: Arc<dyn Diagnostics>,
}

impl FsCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            diagnostics: default_diagnostics(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Ok(Self::new(config.cache_root()?))
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }

    /// Look up `digest`, returning its content if either tier has it.
    ///
    /// This is not a pure read. An index hit rewrites `entries.json` to bump
    /// the entry's `last_used`; a sharded hit inserts the entry into the index
    /// and deletes the loose file. Failures of those writes are reported as
    /// warnings and the hit is still returned. Sharded read errors other than
    /// "not found" are returned.
    pub fn find(&self, digest: &Digest) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.lookup(digest)?.map(|hit| hit.content))
    }

    /// Like [`FsCache::find`], also reporting which tier answered.
    pub fn lookup(&self, digest: &Digest) -> Result<Option<Hit>, CacheError> {
        let key = digest.to_hex();
        let path = index_path(&self.root);
        let mut entries = index::load(&path, self.diagnostics.as_ref());

        if let Some(entry) = entries.get_mut(&key) {
            entry.last_used = now();
            let content = entry.content.clone();
            if let Err(err) = index::save(&path, &entries) {
                self.warn_refresh(&key, &err);
            }
            return Ok(Some(Hit {
                content,
                tier: Tier::Index,
            }));
        }

        let entry_path = resolve(&self.root, digest)?.entry_path;
        let Some(content) = sharded::read(&self.root, digest)? else {
            return Ok(None);
        };

        entries.insert(key.clone(), Entry::new(content.clone(), now()));
        match index::save(&path, &entries) {
            // Only drop the loose file once the index holds the entry.
            Ok(()) => {
                if let Err(err) = sharded::remove(&self.root, digest) {
                    self.diagnostics.warn(CacheWarning::MigrationDeleteFailed {
                        path: entry_path,
                        error: err.to_string(),
                    });
                }
            }
            Err(err) => self.warn_refresh(&key, &err),
        }

        Ok(Some(Hit {
            content,
            tier: Tier::Sharded,
        }))
    }

    /// Store `content` under `digest` in the sharded tier.
    ///
    /// The index is never written here; pruning folds the file in later.
    pub fn save(&self, digest: &Digest, content: &[u8]) -> Result<(), CacheError> {
        sharded::write(&self.root, digest, content)
    }

    fn warn_refresh(&self, key: &str, err: &CacheError) {
        self.diagnostics.warn(CacheWarning::IndexRefreshFailed {
            digest: key.to_string(),
            error: err.to_string(),
        });
    }
}
