//! Consolidated index - `entries.json` at the cache root
//!
//! A single JSON document mapping hex digests to their content and last-used
//! time. Loading never fails; saving always rewrites the whole file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache::diagnostics::{CacheWarning, Diagnostics};
use crate::core::util::atomic_write;
use crate::error::CacheError;

/// File name of the consolidated index under the cache root
pub const ENTRIES_FILE: &str = "entries.json";

/// Path of the consolidated index for a cache root
pub fn index_path(root: &Path) -> PathBuf {
    root.join(ENTRIES_FILE)
}

/// One cached artifact and when it was last used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EntryRepr", into = "EntryRepr")]
pub struct Entry {
    /// Empty content and absent content are the same thing.
    pub content: Vec<u8>,
    pub last_used: DateTime<Utc>,
}

impl Entry {
    pub fn new(content: impl Into<Vec<u8>>, last_used: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            last_used,
        }
    }
}

/// On-disk shape. UTF-8 content goes in `content` as a plain string so the
/// file stays readable; anything else is hex-encoded under `content_hex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_hex: Option<String>,
    last_used: DateTime<Utc>,
}

impl From<Entry> for EntryRepr {
    fn from(entry: Entry) -> Self {
        let (content, content_hex) = if entry.content.is_empty() {
            (None, None)
        } else {
            match String::from_utf8(entry.content) {
                Ok(text) => (Some(text), None),
                Err(err) => (None, Some(hex::encode(err.into_bytes()))),
            }
        };
        Self {
            content,
            content_hex,
            last_used: entry.last_used,
        }
    }
}

impl TryFrom<EntryRepr> for Entry {
    type Error = String;

    fn try_from(repr: EntryRepr) -> Result<Self, Self::Error> {
        let content = match (repr.content, repr.content_hex) {
            (Some(_), Some(_)) => {
                return Err("entry has both `content` and `content_hex`".to_string())
            }
            (Some(text), None) => text.into_bytes(),
            (None, Some(encoded)) => {
                hex::decode(encoded).map_err(|e| format!("invalid `content_hex`: {e}"))?
            }
            (None, None) => Vec::new(),
        };
        Ok(Self {
            content,
            last_used: repr.last_used,
        })
    }
}

/// Hex digest -> entry. Sorted so the serialized file diffs cleanly.
pub type Entries = BTreeMap<String, Entry>;

/// Read the index at `path`.
///
/// A missing file is an empty index. An unreadable or unparsable file is
/// reported through `diagnostics` and also yields an empty index, so a broken
/// index degrades lookups to misses instead of failing the caller.
pub fn load(path: &Path, diagnostics: &dyn Diagnostics) -> Entries {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Entries::new(),
        Err(err) => {
            diagnostics.warn(CacheWarning::IndexUnreadable {
                path: path.to_path_buf(),
                error: err.to_string(),
            });
            return Entries::new();
        }
    };

    match serde_json::from_slice::<Entries>(&bytes) {
        Ok(entries) => entries,
        Err(err) => {
            diagnostics.warn(CacheWarning::IndexCorrupt {
                path: path.to_path_buf(),
                error: err.to_string(),
            });
            Entries::new()
        }
    }
}

/// Serialize `entries` with two-space indentation and replace the file at
/// `path` in one rename.
pub fn save(path: &Path, entries: &Entries) -> Result<(), CacheError> {
    let json = serde_json::to_vec_pretty(entries)?;
    atomic_write(path, &json)?;
    Ok(())
}
