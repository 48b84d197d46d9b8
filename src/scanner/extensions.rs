//! Extension allow-list.
//!
//! Only files whose final extension appears in the allow-list ever enter the
//! size classifier. Matching is case-insensitive, so `IMG_0001.JPG` and
//! `img_0001.jpg` are both accepted by the default list.

use std::collections::BTreeSet;
use std::path::Path;

/// Photo, video and archive formats compared by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "mov", "nef", "raf", "mp4", "png", "tiff", "heic", "dng", "mkv", "tgz", "zip",
    "rar",
];

/// Case-insensitive set of file extensions eligible for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl ExtensionFilter {
    /// Build a filter from extensions given with or without a leading dot.
    ///
    /// ```
    /// use photodedupe::scanner::ExtensionFilter;
    /// use std::path::Path;
    ///
    /// let filter = ExtensionFilter::new([".CR2", "jpg"]);
    /// assert!(filter.allows(Path::new("shot.cr2")));
    /// assert!(filter.allows(Path::new("shot.JPG")));
    /// assert!(!filter.allows(Path::new("shot.png")));
    /// ```
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| normalize(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// Check whether a path's extension is in the allow-list.
    #[must_use]
    pub fn allows(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }

    /// Number of distinct extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the allow-list is empty (nothing will be compared).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Iterate over the normalized extensions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}
