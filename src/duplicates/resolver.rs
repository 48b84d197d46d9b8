//! Original selection for duplicate sets.
//!
//! Each set keeps exactly one member, the *original*: the member whose path
//! is shortest in bytes, the earliest one winning ties. Every other member is
//! a *reject*, listed in its original order.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use super::DuplicateSet;
use crate::scanner::Digest;

/// A duplicate set split into its original and rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSet {
    /// Content digest shared by every member
    pub digest: Digest,
    /// File size in bytes
    pub size: u64,
    /// The member that stays in place
    pub original: PathBuf,
    /// Members to quarantine, in set order with the original removed
    pub rejects: Vec<PathBuf>,
}

impl ResolvedSet {
    /// Bytes reclaimed by quarantining every reject.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.rejects.len() as u64
    }
}

/// Index of the shortest path, first occurrence winning ties.
///
/// ```
/// use photodedupe::duplicates::shortest_index;
/// use std::path::PathBuf;
///
/// let paths = vec![
///     PathBuf::from("a/copy/img.jpg"),
///     PathBuf::from("a/img.jpg"),
///     PathBuf::from("b/img.jpg"),
/// ];
/// assert_eq!(shortest_index(&paths), Some(1));
/// ```
#[must_use]
pub fn shortest_index(paths: &[PathBuf]) -> Option<usize> {
    // min_by_key returns the first minimum
    paths
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| p.as_os_str().len())
        .map(|(i, _)| i)
}

/// Select the original of a set. Returns `None` for sets of fewer than 2.
#[must_use]
pub fn resolve(set: &DuplicateSet) -> Option<ResolvedSet> {
    if set.paths.len() < 2 {
        return None;
    }
    let keep = shortest_index(&set.paths)?;

    let rejects: Vec<PathBuf> = set
        .paths
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != keep)
        .map(|(_, p)| p.clone())
        .collect();

    log::trace!(
        "Keeping {} ({} reject(s))",
        set.paths[keep].display(),
        rejects.len()
    );

    Some(ResolvedSet {
        digest: set.digest,
        size: set.size,
        original: set.paths[keep].clone(),
        rejects,
    })
}

/// Resolve every set and order them for presentation.
#[must_use]
pub fn resolve_all(sets: &[DuplicateSet]) -> Vec<ResolvedSet> {
    let mut resolved: Vec<ResolvedSet> = sets.iter().filter_map(resolve).collect();
    resolved.sort_by(|a, b| compare_originals(&a.original, &b.original));
    resolved
}

/// Case-insensitive path order, falling back to exact comparison.
#[must_use]
pub fn compare_originals(a: &Path, b: &Path) -> Ordering {
    let lower_a = a.to_string_lossy().to_lowercase();
    let lower_b = b.to_string_lossy().to_lowercase();
    lower_a.cmp(&lower_b).then_with(|| a.cmp(b))
}
