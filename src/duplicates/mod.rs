//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Prefix-fingerprint comparison (Phase 2)
//! - Full-content hash comparison (Phase 3)
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    phase2_prehash, phase3_fullhash, DuplicateFinder, FinderConfig, FinderError, FullhashConfig,
    FullhashStats, PrehashConfig, PrehashStats, ScanSummary,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats};
