//! Core module - Fundamental data structures and utilities
//!
//! This module provides:
//! - Opaque digests and their hex form
//! - Shard path resolution
//! - Unified result model (ResultItem) and rendering
//! - Common filesystem utilities

pub mod digest;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
