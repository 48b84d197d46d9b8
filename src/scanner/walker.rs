//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting the candidates that feed size classification.
//!
//! # Features
//!
//! - Single-threaded traversal with children sorted by file name, so the
//!   order files are discovered in is the same on every run
//! - Quarantine folders are pruned, never descended into
//! - Extension allow-list and optional size bounds
//! - Symlinks are never followed and never become candidates
//! - Unreadable entries are yielded as [`ScanError`] values, traversal continues
//!
//! # Example
//!
//! ```no_run
//! use photodedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} candidate files", files.len());
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for candidate discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let quarantine = OsString::from(&self.config.quarantine_dir_name);

        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !is_quarantine_dir(entry, &quarantine))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(entry),
                Err(e) => Some(Err(self.handle_walkdir_error(e))),
            })
    }

    /// Turn a directory entry into a candidate if it passes every filter.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<FileEntry, ScanError>> {
        // Directories, symlinks, sockets and the like are never candidates
        if !entry.file_type().is_file() {
            return None;
        }

        let path = entry.into_path();

        if !self.config.extensions.allows(&path) {
            log::trace!("Skipping file outside allow-list: {}", path.display());
            return None;
        }

        let metadata = match std::fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Cannot read metadata for {}: {}", path.display(), e);
                return Some(Err(ScanError::from_io(path, e)));
            }
        };

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        Some(Ok(FileEntry::new(path, size)))
    }

    /// Convert a walkdir error into a scan error.
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        log::warn!("Walker error for {}: {}", path.display(), error);

        match error.into_io_error() {
            Some(io_error) => ScanError::from_io(path, io_error),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("filesystem loop detected"),
            },
        }
    }
}

/// Whether an entry is a quarantine folder below the root.
fn is_quarantine_dir(entry: &DirEntry, quarantine: &OsString) -> bool {
    let skip = entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name() == quarantine.as_os_str();
    if skip {
        log::debug!("Skipping quarantine folder: {}", entry.path().display());
    }
    skip
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::ExtensionFilter;
    use std::fs;
    use tempfile::TempDir;

    /// Create a small photo tree.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::write(dir.path().join("b.jpg"), b"photo b").unwrap();
        fs::write(dir.path().join("a.JPG"), b"photo a").unwrap();
        fs::write(dir.path().join("notes.txt"), b"not a photo").unwrap();

        let subdir = dir.path().join("2020-01-01");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("clip.mov"), b"video").unwrap();

        dir
    }

    fn names(files: &[FileEntry]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_walker_finds_allowed_files() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        assert!(!names(&files).contains(&"notes.txt".to_string()));
        for file in &files {
            assert!(file.path.exists());
            assert_eq!(file.size, fs::metadata(&file.path).unwrap().len());
        }
    }

    #[test]
    fn test_walker_order_is_sorted_by_name() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let first: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        let second: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        // "2020-01-01" < "a.JPG" < "b.jpg" byte-wise
        assert_eq!(names(&first), vec!["clip.mov", "a.JPG", "b.jpg"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_walker_skips_quarantine_subtree() {
        let dir = create_test_dir();
        let rejected = dir.path().join("2020-01-01").join("_Rejected");
        fs::create_dir_all(rejected.join("nested")).unwrap();
        fs::write(rejected.join("clip_1.mov"), b"video").unwrap();
        fs::write(rejected.join("nested").join("deep.jpg"), b"deep").unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        assert!(files
            .iter()
            .all(|f| !f.path.components().any(|c| c.as_os_str() == "_Rejected")));
    }

    #[test]
    fn test_walker_custom_quarantine_name() {
        let dir = create_test_dir();
        fs::create_dir(dir.path().join("_Rejected")).unwrap();
        fs::write(dir.path().join("_Rejected").join("x.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("_Dupes")).unwrap();
        fs::write(dir.path().join("_Dupes").join("y.jpg"), b"y").unwrap();

        let config = WalkerConfig::default().with_quarantine_dir_name("_Dupes");
        let walker = Walker::new(dir.path(), config);
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        let found = names(&files);
        assert!(found.contains(&"x.jpg".to_string()));
        assert!(!found.contains(&"y.jpg".to_string()));
    }

    #[test]
    fn test_walker_file_named_like_quarantine_is_kept() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_Rejected.jpg"), b"x").unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_walker_size_filters() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small.jpg"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("medium.jpg"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("large.jpg"), vec![0u8; 1000]).unwrap();

        let config = WalkerConfig::default().with_size_bounds(Some(50), Some(500));
        let walker = Walker::new(dir.path(), config);
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(names(&files), vec!["medium.jpg"]);
    }

    #[test]
    fn test_walker_custom_extensions() {
        let dir = create_test_dir();
        let config = WalkerConfig::default().with_extensions(ExtensionFilter::new(["txt"]));
        let walker = Walker::new(dir.path(), config);
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(names(&files), vec!["notes.txt"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_walker_ignores_symlinks() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("b.jpg"), dir.path().join("link.jpg"))
            .unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert!(!names(&files).contains(&"link.jpg".to_string()));
    }

    #[test]
    fn test_walker_handles_nonexistent_path() {
        let walker = Walker::new(
            Path::new("/nonexistent/path/12345"),
            WalkerConfig::default(),
        );

        let results: Vec<_> = walker.walk().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ScanError::NotFound(_))));
    }
}
