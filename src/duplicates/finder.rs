//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Size phase**: group files by exact length while traversal runs
//!    (see [`crate::duplicates::groups`])
//! 2. **Hash phase**: digest the full content of every size match and group
//!    by digest
//!
//! Any read failure during the hash phase aborts the run. Traversal errors
//! are collected in the [`ScanSummary`] and never abort.
//!
//! # Example
//!
//! ```no_run
//! use photodedupe::scanner::{Walker, WalkerConfig, FileEntry, Hasher};
//! use photodedupe::duplicates::{flatten_candidates, group_by_size, identify_content, HashConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<FileEntry> = walker.walk().filter_map(Result::ok).collect();
//! let (size_groups, _) = group_by_size(files);
//!
//! let candidates = flatten_candidates(size_groups);
//! let (sets, stats) = identify_content(&candidates, &Hasher::new(), &HashConfig::default())
//!     .expect("hashing failed");
//! println!("{} duplicate sets, {} bytes hashed", sets.len(), stats.bytes_hashed);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::{DuplicateSet, SizeClassifier};
use crate::progress::{ItemStatus, ProgressCallback, PHASE_HASH, PHASE_SIZE};
use crate::scanner::{Digest, FileEntry, HashError, Hasher, ScanError, Walker, WalkerConfig};

/// Files above this size are logged when hashing starts.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Configuration for the hash phase.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of I/O threads. 1 hashes sequentially in candidate order.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            io_threads: 1,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the number of I/O threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Statistics from the hash phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStats {
    /// Number of candidates handed to the hash phase
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of duplicate sets found
    pub duplicate_sets: usize,
    /// Number of rejects (set members minus one original per set)
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per set
    pub wasted_space: u64,
}

/// Digest every candidate and group them by content.
///
/// Sets are returned in order of first appearance of their digest, and
/// members keep candidate order, regardless of `io_threads`.
///
/// # Errors
///
/// Returns the first [`HashError`] in candidate order. Sequential hashing
/// stops at that file; parallel hashing finishes in-flight work first.
pub fn identify_content(
    candidates: &[FileEntry],
    hasher: &Hasher,
    config: &HashConfig,
) -> Result<(Vec<DuplicateSet>, HashStats), HashError> {
    let mut stats = HashStats {
        input_files: candidates.len(),
        ..HashStats::default()
    };

    if candidates.is_empty() {
        log::debug!("Hash phase: no candidates to process");
        return Ok((Vec::new(), stats));
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_HASH, candidates.len());
    }

    log::info!(
        "Hash phase: computing digests for {} files ({} thread(s))",
        candidates.len(),
        config.io_threads
    );

    let digests = if config.io_threads > 1 {
        hash_parallel(candidates, hasher, config)
    } else {
        hash_sequential(candidates, hasher, config)
    };

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_HASH);
    }

    let digests = digests?;

    let mut index: HashMap<Digest, usize> = HashMap::new();
    let mut grouped: Vec<DuplicateSet> = Vec::new();

    for (file, digest) in candidates.iter().zip(digests) {
        stats.hashed_files += 1;
        stats.bytes_hashed += file.size;

        match index.get(&digest) {
            Some(&i) => grouped[i].paths.push(file.path.clone()),
            None => {
                index.insert(digest, grouped.len());
                grouped.push(DuplicateSet::new(digest, file.size, vec![file.path.clone()]));
            }
        }
    }

    let sets: Vec<DuplicateSet> = grouped
        .into_iter()
        .filter(|set| {
            if set.len() > 1 {
                log::debug!(
                    "Duplicate set {}: {} files, {} bytes each",
                    set.digest_hex(),
                    set.len(),
                    set.size
                );
                true
            } else {
                false
            }
        })
        .collect();

    stats.duplicate_sets = sets.len();
    stats.duplicate_files = sets.iter().map(|s| s.len() - 1).sum();
    stats.wasted_space = sets.iter().map(DuplicateSet::wasted_space).sum();

    log::info!(
        "Hash phase complete: {} sets, {} duplicates, {} reclaimable",
        stats.duplicate_sets,
        stats.duplicate_files,
        ByteSize::b(stats.wasted_space)
    );

    Ok((sets, stats))
}

fn hash_one(
    file: &FileEntry,
    hasher: &Hasher,
    config: &HashConfig,
    seen: &Mutex<HashSet<Digest>>,
) -> Result<Digest, HashError> {
    if file.size > LARGE_FILE_THRESHOLD {
        log::debug!(
            "Hashing large file ({}): {}",
            ByteSize::b(file.size),
            file.path.display()
        );
    }

    let result = hasher.hash_entry(file);

    if let Some(ref callback) = config.progress_callback {
        let status = match &result {
            Ok(digest) => match seen.lock() {
                Ok(mut seen) => {
                    if !seen.insert(*digest) {
                        ItemStatus::Match
                    } else {
                        ItemStatus::FirstSeen
                    }
                }
                Err(_) => ItemStatus::FirstSeen,
            },
            Err(_) => ItemStatus::Error,
        };
        callback.on_item(status);
    }

    result
}

fn hash_sequential(
    candidates: &[FileEntry],
    hasher: &Hasher,
    config: &HashConfig,
) -> Result<Vec<Digest>, HashError> {
    let seen = Mutex::new(HashSet::new());
    candidates
        .iter()
        .map(|file| {
            hash_one(file, hasher, config, &seen).inspect_err(|e| {
                log::error!("Failed to hash {}: {}", file.path.display(), e);
            })
        })
        .collect()
}

fn hash_parallel(
    candidates: &[FileEntry],
    hasher: &Hasher,
    config: &HashConfig,
) -> Result<Vec<Digest>, HashError> {
    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("Failed to create hashing thread pool ({}), hashing sequentially", e);
            return hash_sequential(candidates, hasher, config);
        }
    };

    let seen = Mutex::new(HashSet::new());
    let results: Vec<Result<Digest, HashError>> = pool.install(|| {
        candidates
            .par_iter()
            .map(|file| hash_one(file, hasher, config, &seen))
            .collect()
    });

    // Collecting into Result keeps the first error in candidate order
    results.into_iter().collect::<Result<Vec<_>, _>>().inspect_err(|e| {
        log::error!("Failed to hash {}: {}", e.path().display(), e);
    })
}

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Traversal settings.
    pub walker_config: WalkerConfig,
    /// Number of I/O threads for the hash phase.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the traversal configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn hash_config(&self) -> HashConfig {
        HashConfig {
            io_threads: self.io_threads.max(1),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of candidate files found by traversal
    pub total_files: usize,
    /// Total size of all candidate files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size (unique lengths)
    pub eliminated_by_size: usize,
    /// Number of files handed to the hash phase
    pub candidates: usize,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Total number of rejects (excluding originals)
    pub duplicate_files: usize,
    /// Space reclaimed by quarantining every reject
    pub reclaimable_space: u64,
    /// Duration of the scan
    pub scan_duration: Duration,
    /// Traversal errors collected along the way
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of scanned bytes taken up by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    /// Whether any traversal errors were collected.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A candidate could not be hashed.
    ///
    /// Traversal errors collected before the failure travel with it so they
    /// can still be reported.
    #[error("hashing aborted")]
    Hash {
        /// The read or digest failure
        #[source]
        source: HashError,
        /// Traversal errors collected before hashing started
        scan_errors: Vec<ScanError>,
    },
}

impl From<HashError> for FinderError {
    fn from(source: HashError) -> Self {
        Self::Hash {
            source,
            scan_errors: Vec::new(),
        }
    }
}

/// Duplicate finder that runs traversal, size and hash phases.
///
/// # Example
///
/// ```no_run
/// use photodedupe::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
/// let (sets, summary) = finder.find_duplicates(Path::new("/photos")).unwrap();
///
/// println!("Found {} duplicate sets", sets.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate sets under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the path does not exist, is not a directory,
    /// or any candidate cannot be hashed. Traversal errors are collected in
    /// [`ScanSummary::scan_errors`] instead.
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!("Starting duplicate scan of {}", path.display());

        let callback = self.config.progress_callback.as_ref();
        if let Some(callback) = callback {
            callback.on_phase_start(PHASE_SIZE, 0);
            callback.on_message(&format!("Walking {}", path.display()));
        }

        let walker = Walker::new(path, self.config.walker_config.clone());
        let mut classifier = SizeClassifier::new();
        let mut scan_errors = Vec::new();

        for result in walker.walk() {
            let status = match result {
                Ok(file) => {
                    if classifier.insert(file) {
                        ItemStatus::Match
                    } else {
                        ItemStatus::FirstSeen
                    }
                }
                Err(e) => {
                    scan_errors.push(e);
                    ItemStatus::Error
                }
            };
            if let Some(callback) = callback {
                callback.on_item(status);
            }
        }

        if let Some(callback) = callback {
            callback.on_phase_end(PHASE_SIZE);
        }

        if !scan_errors.is_empty() {
            log::warn!("{} traversal error(s) collected", scan_errors.len());
        }

        let (sets, mut summary) = match self.run_phases(classifier) {
            Ok(found) => found,
            Err(FinderError::Hash { source, .. }) => {
                return Err(FinderError::Hash {
                    source,
                    scan_errors,
                })
            }
            Err(e) => return Err(e),
        };
        summary.scan_errors = scan_errors;
        summary.scan_duration = start_time.elapsed();
        Ok((sets, summary))
    }

    /// Find duplicates among a pre-collected list of files.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Hash` if any candidate cannot be hashed.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        log::info!("Starting duplicate scan of {} pre-collected files", files.len());

        let mut classifier = SizeClassifier::new();
        for file in files {
            classifier.insert(file);
        }

        let (sets, mut summary) = self.run_phases(classifier)?;
        summary.scan_duration = start_time.elapsed();
        Ok((sets, summary))
    }

    fn run_phases(
        &self,
        classifier: SizeClassifier,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let (size_groups, size_stats) = classifier.finish();
        let candidates = super::flatten_candidates(size_groups);

        log::info!(
            "Found {} files ({} total)",
            size_stats.total_files,
            ByteSize::b(size_stats.total_size)
        );

        let (sets, hash_stats) =
            identify_content(&candidates, &self.hasher, &self.config.hash_config())?;

        let summary = ScanSummary {
            total_files: size_stats.total_files,
            total_size: size_stats.total_size,
            eliminated_by_size: size_stats.eliminated_unique,
            candidates: candidates.len(),
            bytes_hashed: hash_stats.bytes_hashed,
            duplicate_sets: hash_stats.duplicate_sets,
            duplicate_files: hash_stats.duplicate_files,
            reclaimable_space: hash_stats.wasted_space,
            ..ScanSummary::default()
        };

        Ok((sets, summary))
    }
}
