//! Unified Result Model
//!
//! Every command maps its outcome to this model before rendering output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Entry,
    Miss,
    Saved,
    Prune,
    Status,
}

/// Which storage tier answered a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Index,
    Sharded,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Content size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,

    /// Whether the excerpt is a lossy rendering of non-UTF-8 content
    #[serde(default)]
    pub lossy: bool,
}

/// Error information for a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheIssue {
    pub code: String,
    pub message: String,
}

impl CacheIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    pub kind: Kind,

    /// Lowercase hex digest this item is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Cached content (lossy UTF-8) or a human summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured payload for reports (prune/status)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CacheIssue>,
}

impl ResultItem {
    fn bare(kind: Kind) -> Self {
        Self {
            kind,
            digest: None,
            excerpt: None,
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// A cache hit carrying its content
    pub fn entry(digest: impl Into<String>, content: &[u8], tier: Tier) -> Self {
        let excerpt = String::from_utf8_lossy(content);
        let lossy = matches!(excerpt, std::borrow::Cow::Owned(_));
        let mut item = Self::bare(Kind::Entry);
        item.digest = Some(digest.into());
        item.excerpt = Some(excerpt.into_owned());
        item.meta = Meta {
            size: Some(content.len() as u64),
            tier: Some(tier),
            last_used: None,
            lossy,
        };
        item
    }

    /// A lookup that found nothing in either tier
    pub fn miss(digest: impl Into<String>) -> Self {
        let mut item = Self::bare(Kind::Miss);
        item.digest = Some(digest.into());
        item
    }

    /// A successful save into the sharded tier
    pub fn saved(digest: impl Into<String>, size: u64) -> Self {
        let mut item = Self::bare(Kind::Saved);
        item.digest = Some(digest.into());
        item.meta.size = Some(size);
        item.meta.tier = Some(Tier::Sharded);
        item
    }

    /// A maintenance report
    pub fn report(kind: Kind, summary: impl Into<String>, data: serde_json::Value) -> Self {
        let mut item = Self::bare(kind);
        item.excerpt = Some(summary.into());
        item.data = Some(data);
        item
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Add an error
    pub fn with_error(mut self, error: CacheIssue) -> Self {
        self.errors.push(error);
        self
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
