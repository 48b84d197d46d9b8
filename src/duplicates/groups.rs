//! Size classification and duplicate set types.
//!
//! # Overview
//!
//! Size classification is the first comparison phase. Files are grouped by
//! exact byte length, since files with different lengths cannot be
//! duplicates. Lengths seen only once are pruned and never reach hashing.
//!
//! # Example
//!
//! ```
//! use photodedupe::scanner::FileEntry;
//! use photodedupe::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/a/img.jpg"), 1024),
//!     FileEntry::new(PathBuf::from("/b/img.jpg"), 1024),
//!     FileEntry::new(PathBuf::from("/c/clip.mov"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, Digest, FileEntry};

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in traversal order
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    /// Create a new, empty size group.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Statistics from the size classification phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size classification.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Incremental size classifier.
///
/// Entries are fed one at a time while traversal is still running, so the
/// size phase can report a status for each file as it is discovered.
#[derive(Debug, Default)]
pub struct SizeClassifier {
    /// Index into `groups` for each length seen so far
    index: HashMap<u64, usize>,
    /// Groups in order of first appearance of their length
    groups: Vec<SizeGroup>,
    total_size: u64,
    total_files: usize,
}

impl SizeClassifier {
    /// Create an empty classifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Returns `true` if its length was already seen.
    pub fn insert(&mut self, entry: FileEntry) -> bool {
        self.total_files += 1;
        self.total_size += entry.size;

        match self.index.get(&entry.size) {
            Some(&i) => {
                self.groups[i].files.push(entry);
                true
            }
            None => {
                self.index.insert(entry.size, self.groups.len());
                let mut group = SizeGroup::new(entry.size);
                group.files.push(entry);
                self.groups.push(group);
                false
            }
        }
    }

    /// Number of entries inserted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total_files
    }

    /// Whether nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }

    /// Prune singleton lengths and return the surviving groups.
    #[must_use]
    pub fn finish(self) -> (Vec<SizeGroup>, GroupingStats) {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            total_size: self.total_size,
            unique_sizes: self.groups.len(),
            ..GroupingStats::default()
        };

        let groups: Vec<SizeGroup> = self
            .groups
            .into_iter()
            .filter(|group| {
                if group.has_duplicates() {
                    stats.potential_duplicates += group.len();
                    stats.duplicate_groups += 1;
                    log::debug!(
                        "Size group {} bytes: {} potential duplicates",
                        group.size,
                        group.len()
                    );
                    true
                } else {
                    stats.eliminated_unique += group.len();
                    log::trace!(
                        "Eliminated unique size {}: {}",
                        group.size,
                        group.files[0].path.display()
                    );
                    false
                }
            })
            .collect();

        log::info!(
            "Size phase complete: {} files -> {} candidates ({:.1}% eliminated)",
            stats.total_files,
            stats.potential_duplicates,
            stats.elimination_rate()
        );

        (groups, stats)
    }
}

/// Group files by size in one call.
///
/// Only groups with two or more files are returned, ordered by first
/// appearance of their length.
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileEntry>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut classifier = SizeClassifier::new();
    for file in files {
        classifier.insert(file);
    }
    classifier.finish()
}

/// Flatten size groups into the candidate list for hashing.
#[must_use]
pub fn flatten_candidates(groups: Vec<SizeGroup>) -> Vec<FileEntry> {
    groups.into_iter().flat_map(|g| g.files).collect()
}

/// Files sharing an identical content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    /// Content digest shared by every member
    pub digest: Digest,
    /// File size in bytes
    pub size: u64,
    /// Member paths in candidate order (always 2 or more)
    pub paths: Vec<PathBuf>,
}

impl DuplicateSet {
    /// Create a new duplicate set.
    #[must_use]
    pub fn new(digest: Digest, size: u64, paths: Vec<PathBuf>) -> Self {
        Self {
            digest,
            size,
            paths,
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Bytes reclaimed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.paths.len().saturating_sub(1) as u64
    }
}
