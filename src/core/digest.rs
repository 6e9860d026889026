//! Opaque cache keys
//!
//! The cache never inspects a digest's structure. It only needs a stable
//! lowercase-hex rendering for file names and index keys.

use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

/// Caller-supplied identifier for a cached artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(Vec<u8>);

impl Digest {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form used for shard paths and index keys.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a hex string (either case).
    pub fn from_hex(input: &str) -> Result<Self, CacheError> {
        let trimmed = input.trim();
        hex::decode(trimmed)
            .map(Self)
            .map_err(|err| CacheError::InvalidDigest {
                input: input.to_string(),
                reason: err.to_string(),
            })
    }
}

impl From<&[u8]> for Digest {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Digest {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl FromStr for Digest {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
