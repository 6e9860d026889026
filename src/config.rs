//! Cache root configuration

use std::path::PathBuf;

use crate::error::CacheError;

/// Environment variable that overrides the default cache root.
pub const CACHE_DIR_ENV: &str = "CLANG_TIDY_CACHE_DIR";

/// Configuration for selecting the on-disk cache root.
#[derive(Clone, Debug, Default)]
pub struct CacheConfig {
    /// Use this directory instead of `~/.ctcache/cache`.
    pub root_override: Option<PathBuf>,
}

impl CacheConfig {
    pub fn new(root_override: Option<PathBuf>) -> Self {
        Self { root_override }
    }

    /// Resolve the cache root. Does not create it.
    pub fn cache_root(&self) -> Result<PathBuf, CacheError> {
        match &self.root_override {
            Some(root) => Ok(root.clone()),
            None => default_cache_root(),
        }
    }
}

pub(crate) fn default_cache_root() -> Result<PathBuf, CacheError> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(CacheError::MissingHomeDir)?;

    Ok(home.join(".ctcache").join("cache"))
}
