//! Streaming file digests.
//!
//! # Overview
//!
//! Files are streamed through BLAKE3 in fixed-size chunks and the first
//! [`DIGEST_LEN`] bytes of its extendable output are kept as the content
//! identity. 160 bits keeps accidental collisions out of reach for any
//! realistic photo library while matching the fixed-width digest used
//! throughout the pipeline.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::{FileEntry, HashError};

/// Width of a content digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// Fixed-width content digest.
pub type Digest = [u8; DIGEST_LEN];

/// Default read buffer (64 KiB).
const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Use a custom read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Digest, HashError> {
        self.stream_file(path).map(|(digest, _)| digest)
    }

    /// Hash a scanned entry, verifying the byte count matches its scanned size.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::SizeChanged`] if the file was truncated or grew
    /// after traversal, or any open/read error.
    pub fn hash_entry(&self, entry: &FileEntry) -> Result<Digest, HashError> {
        let (digest, read) = self.stream_file(&entry.path)?;
        if read != entry.size {
            return Err(HashError::SizeChanged {
                path: entry.path.clone(),
                expected: entry.size,
                actual: read,
            });
        }
        Ok(digest)
    }

    /// Hash everything a reader yields, returning the digest and byte count.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<(Digest, u64)> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total = 0u64;

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                    total += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let mut digest = [0u8; DIGEST_LEN];
        hasher.finalize_xof().fill(&mut digest);
        Ok((digest, total))
    }

    fn stream_file(&self, path: &Path) -> Result<(Digest, u64), HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let result = self
            .hash_reader(file)
            .map_err(|e| HashError::from_io(path, e))?;
        log::trace!("Hashed {} ({} bytes)", path.display(), result.1);
        Ok(result)
    }
}

/// Render a digest as lowercase hexadecimal.
///
/// ```
/// use photodedupe::scanner::hash_to_hex;
///
/// let mut digest = [0u8; 20];
/// digest[0] = 0xab;
/// assert!(hash_to_hex(&digest).starts_with("ab00"));
/// assert_eq!(hash_to_hex(&digest).len(), 40);
/// ```
#[must_use]
pub fn hash_to_hex(digest: &Digest) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
