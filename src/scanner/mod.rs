//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Deterministic directory walking using walkdir
//! - Extension allow-list filtering
//! - Content hashing with BLAKE3 (160-bit digests)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`extensions`]: Case-insensitive extension allow-list
//! - [`hasher`]: Streaming file digests
//!
//! # Example
//!
//! ```no_run
//! use photodedupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod extensions;
pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};

pub use extensions::{ExtensionFilter, DEFAULT_EXTENSIONS};
pub use hasher::{hash_to_hex, Digest, Hasher, DIGEST_LEN};
pub use walker::Walker;

/// Name of the folder rejected copies are moved into.
pub const DEFAULT_QUARANTINE_DIR: &str = "_Rejected";

/// A regular file eligible for duplicate comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file as discovered under the scan root
    pub path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Extensions eligible for comparison.
    pub extensions: ExtensionFilter,

    /// Directory name whose subtrees are never scanned.
    pub quarantine_dir_name: String,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            extensions: ExtensionFilter::default(),
            quarantine_dir_name: DEFAULT_QUARANTINE_DIR.to_string(),
            min_size: None,
            max_size: None,
        }
    }
}

impl WalkerConfig {
    /// Replace the extension allow-list.
    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionFilter) -> Self {
        self.extensions = extensions;
        self
    }

    /// Set the quarantine folder name that is skipped during traversal.
    #[must_use]
    pub fn with_quarantine_dir_name(mut self, name: impl Into<String>) -> Self {
        self.quarantine_dir_name = name.into();
        self
    }

    /// Set the inclusive size bounds.
    #[must_use]
    pub fn with_size_bounds(mut self, min_size: Option<u64>, max_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }
}

/// Errors that can occur during directory scanning.
///
/// These never abort a run; they are collected and reported after traversal.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Build a scan error from an I/O error, mapping well-known kinds.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p) | Self::NotFound(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur during file hashing.
///
/// Any of these is fatal for a run: a candidate that cannot be read makes
/// every decision about its size group untrustworthy.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The file length changed between scanning and hashing.
    #[error("File changed during scan: {path} (expected {expected} bytes, read {actual})")]
    SizeChanged {
        /// Path of the file
        path: PathBuf,
        /// Length recorded at scan time
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Build a hash error from an I/O error, mapping well-known kinds.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) => p,
            Self::SizeChanged { path, .. } | Self::Io { path, .. } => path,
        }
    }
}
