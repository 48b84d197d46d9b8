//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size classification (first phase)
//! - Content identification by full digest (second phase)
//! - Original selection among each duplicate set

pub mod finder;
pub mod groups;
pub mod resolver;

pub use finder::{
    identify_content, DuplicateFinder, FinderConfig, FinderError, HashConfig, HashStats,
    ScanSummary,
};
pub use groups::{
    flatten_candidates, group_by_size, DuplicateSet, GroupingStats, SizeClassifier, SizeGroup,
};
pub use resolver::{compare_originals, resolve, resolve_all, shortest_index, ResolvedSet};
