//! Cache module - Two-tier on-disk artifact cache
//!
//! Provides:
//! - Sharded file store (one raw file per digest, cheap writes)
//! - Consolidated index (`entries.json`, fast lookup and pruning)
//! - Lookup/save facade over both tiers
//! - Prune pass migrating loose files into the index
//! - Warning side channel and status reporting

pub mod diagnostics;
pub mod facade;
pub mod index;
pub mod prune;
pub mod sharded;
pub mod status;
