//! Shard path resolution
//!
//! Maps a digest to `root/hex[0:2]/hex[2:4]/hex[4:]` and back.

use std::path::{Path, PathBuf};

use crate::core::digest::Digest;
use crate::error::CacheError;

/// Two shard segments of two characters plus at least one for the file name.
pub const MIN_DIGEST_HEX_LEN: usize = 5;

/// Resolved location of a sharded entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPaths {
    /// `root/hex[0:2]/hex[2:4]`
    pub shard_dir: PathBuf,
    /// `shard_dir/hex[4:]`
    pub entry_path: PathBuf,
}

/// Resolve the shard directory and entry file for a digest.
///
/// Digests whose hex form is shorter than [`MIN_DIGEST_HEX_LEN`] are rejected.
pub fn resolve(root: &Path, digest: &Digest) -> Result<ShardPaths, CacheError> {
    resolve_hex(root, &digest.to_hex())
}

/// Same as [`resolve`] for an already hex-encoded key.
pub fn resolve_hex(root: &Path, hex: &str) -> Result<ShardPaths, CacheError> {
    if hex.len() < MIN_DIGEST_HEX_LEN || !hex.is_ascii() {
        return Err(CacheError::DigestTooShort {
            hex: hex.to_string(),
            min: MIN_DIGEST_HEX_LEN,
        });
    }

    let shard_dir = root.join(&hex[0..2]).join(&hex[2..4]);
    let entry_path = shard_dir.join(&hex[4..]);
    Ok(ShardPaths {
        shard_dir,
        entry_path,
    })
}

/// Rebuild the hex key from an entry path under `root`.
///
/// Returns `None` unless the path is exactly `root/<2 hex>/<2 hex>/<hex>`.
pub fn digest_key_from_entry_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;

    let [first, second, name] = parts.as_slice() else {
        return None;
    };
    if first.len() != 2 || second.len() != 2 || name.is_empty() {
        return None;
    }

    let key = format!("{first}{second}{name}");
    if key.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(key.to_ascii_lowercase())
    } else {
        None
    }
}
