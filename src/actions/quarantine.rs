//! Collision-safe relocation of rejects into quarantine folders.
//!
//! # Overview
//!
//! For every resolved duplicate set, each reject is renamed into a
//! fixed-name folder (default `_Rejected`) next to the original. The n-th
//! reject of a set (1-based) becomes `<stem>_<n>.<ext>`. If that name is
//! already taken on disk, or was already handed out earlier in the run, a
//! further `_2`, `_3`, ... is appended until a free name is found, so no
//! file is ever overwritten.
//!
//! In [`RunMode::Simulate`] nothing is created or moved; destinations are
//! computed with the same rules so the report matches what a live run
//! would do.
//!
//! # Example
//!
//! ```no_run
//! use photodedupe::actions::{QuarantineConfig, QuarantineMover, RunMode};
//! use photodedupe::duplicates::ResolvedSet;
//! use std::path::PathBuf;
//!
//! let set = ResolvedSet {
//!     digest: [0; 20],
//!     size: 500,
//!     original: PathBuf::from("a/2020-01-01/img.jpg"),
//!     rejects: vec![PathBuf::from("a/2020-01-01/copy/img.jpg")],
//! };
//!
//! let mut mover = QuarantineMover::new(QuarantineConfig::default().with_mode(RunMode::Live));
//! let outcome = mover.process(&set).unwrap();
//! for relocation in &outcome.relocations {
//!     println!("{} -> {}", relocation.from.display(), relocation.to.display());
//! }
//! ```

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::ResolvedSet;
use crate::scanner::DEFAULT_QUARANTINE_DIR;

/// Whether the filesystem is touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Report planned moves only.
    #[default]
    Simulate,
    /// Create quarantine folders and move rejects.
    Live,
}

impl RunMode {
    /// Whether this mode mutates the filesystem.
    #[must_use]
    pub fn is_live(self) -> bool {
        self == Self::Live
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulate => write!(f, "simulation"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Which directory the quarantine folder is created in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuarantinePlacement {
    /// Next to the set's original.
    #[default]
    BesideOriginal,
    /// Next to each reject.
    BesideReject,
}

/// Configuration for quarantine moves.
#[derive(Debug, Clone)]
pub struct QuarantineConfig {
    /// Simulation or live.
    pub mode: RunMode,
    /// Where quarantine folders are placed.
    pub placement: QuarantinePlacement,
    /// Name of the quarantine folder.
    pub dir_name: String,
}

impl Default for QuarantineConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            placement: QuarantinePlacement::default(),
            dir_name: DEFAULT_QUARANTINE_DIR.to_string(),
        }
    }
}

impl QuarantineConfig {
    /// Set the run mode.
    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the folder placement.
    #[must_use]
    pub fn with_placement(mut self, placement: QuarantinePlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the quarantine folder name.
    #[must_use]
    pub fn with_dir_name(mut self, name: impl Into<String>) -> Self {
        self.dir_name = name.into();
        self
    }
}

/// Error type for quarantine operations. Every variant is fatal.
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// The quarantine folder could not be created.
    #[error("cannot create quarantine folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A reject could not be moved.
    #[error("cannot move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path has no parent directory to hold a quarantine folder.
    #[error("no parent directory for {0}")]
    NoParent(PathBuf),

    /// The reject path has no file name.
    #[error("no file name in {0}")]
    NoFileName(PathBuf),
}

impl QuarantineError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. } | Self::NoParent(path) | Self::NoFileName(path) => path,
            Self::Rename { from, .. } => from,
        }
    }
}

/// One reject and where it went (or would go).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relocation {
    /// Path before the move.
    pub from: PathBuf,
    /// Path inside the quarantine folder.
    pub to: PathBuf,
}

/// Result of processing one resolved set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineOutcome {
    /// The member left in place.
    pub original: PathBuf,
    /// One entry per reject, in reject order.
    pub relocations: Vec<Relocation>,
    /// Whether the moves were performed.
    pub applied: bool,
}

/// Build `<stem>_<n>.<ext>` from a reject's file name.
///
/// ```
/// use photodedupe::actions::destination_name;
/// use std::path::Path;
///
/// assert_eq!(destination_name(Path::new("a/img.jpg"), 1).unwrap(), "img_1.jpg");
/// assert_eq!(destination_name(Path::new("a/archive.tar.gz"), 2).unwrap(), "archive.tar_2.gz");
/// assert_eq!(destination_name(Path::new("a/README"), 3).unwrap(), "README_3");
/// ```
#[must_use]
pub fn destination_name(reject: &Path, n: usize) -> Option<OsString> {
    suffixed_name(reject, &format!("_{n}"))
}

fn suffixed_name(reject: &Path, suffix: &str) -> Option<OsString> {
    let stem = reject.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(suffix);
    if let Some(ext) = reject.extension() {
        name.push(".");
        name.push(ext);
    }
    Some(name)
}

/// Relocates rejects, remembering every destination handed out in this run.
#[derive(Debug)]
pub struct QuarantineMover {
    config: QuarantineConfig,
    /// Destinations already assigned
    claimed: HashSet<PathBuf>,
    /// Quarantine folders already ensured to exist
    created: HashSet<PathBuf>,
    relocated: usize,
}

impl QuarantineMover {
    /// Create a mover.
    #[must_use]
    pub fn new(config: QuarantineConfig) -> Self {
        Self {
            config,
            claimed: HashSet::new(),
            created: HashSet::new(),
            relocated: 0,
        }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &QuarantineConfig {
        &self.config
    }

    /// Number of rejects relocated (or planned) so far.
    #[must_use]
    pub fn relocated(&self) -> usize {
        self.relocated
    }

    /// Number of quarantine folders ensured so far (live mode only).
    #[must_use]
    pub fn folders_created(&self) -> usize {
        self.created.len()
    }

    /// Quarantine folder for a reject of the set whose original is given.
    ///
    /// # Errors
    ///
    /// Returns `NoParent` if the anchoring path has no parent directory.
    pub fn quarantine_dir_for(
        &self,
        original: &Path,
        reject: &Path,
    ) -> Result<PathBuf, QuarantineError> {
        let anchor = match self.config.placement {
            QuarantinePlacement::BesideOriginal => original,
            QuarantinePlacement::BesideReject => reject,
        };
        anchor
            .parent()
            .map(|parent| parent.join(&self.config.dir_name))
            .ok_or_else(|| QuarantineError::NoParent(anchor.to_path_buf()))
    }

    /// Relocate (or plan) every reject of a set.
    ///
    /// # Errors
    ///
    /// Any folder creation or rename failure is returned immediately. Moves
    /// already performed are not rolled back.
    pub fn process(&mut self, set: &ResolvedSet) -> Result<QuarantineOutcome, QuarantineError> {
        let mut relocations = Vec::with_capacity(set.rejects.len());
        self.relocate_into(set, &mut relocations)?;
        Ok(self.outcome(set, relocations))
    }

    fn outcome(&self, set: &ResolvedSet, relocations: Vec<Relocation>) -> QuarantineOutcome {
        QuarantineOutcome {
            original: set.original.clone(),
            relocations,
            applied: self.config.mode.is_live(),
        }
    }

    /// Relocate the rejects of a set, appending each one as it completes.
    fn relocate_into(
        &mut self,
        set: &ResolvedSet,
        relocations: &mut Vec<Relocation>,
    ) -> Result<(), QuarantineError> {
        let live = self.config.mode.is_live();

        for (i, reject) in set.rejects.iter().enumerate() {
            let dir = self.quarantine_dir_for(&set.original, reject)?;

            if live {
                self.ensure_dir(&dir)?;
            }

            let to = self.claim(&dir, reject, i + 1)?;

            if live {
                fs::rename(reject, &to).map_err(|source| {
                    log::error!("Move failed for {}: {}", reject.display(), source);
                    QuarantineError::Rename {
                        from: reject.clone(),
                        to: to.clone(),
                        source,
                    }
                })?;
                log::info!("Moved {} -> {}", reject.display(), to.display());
            } else {
                log::debug!("Would move {} -> {}", reject.display(), to.display());
            }

            self.relocated += 1;
            relocations.push(Relocation {
                from: reject.clone(),
                to,
            });
        }

        Ok(())
    }

    fn ensure_dir(&mut self, dir: &Path) -> Result<(), QuarantineError> {
        if self.created.contains(dir) {
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|source| QuarantineError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        log::debug!("Quarantine folder ready: {}", dir.display());
        self.created.insert(dir.to_path_buf());
        Ok(())
    }

    /// Pick the first free destination for the n-th reject and claim it.
    fn claim(&mut self, dir: &Path, reject: &Path, n: usize) -> Result<PathBuf, QuarantineError> {
        let no_name = || QuarantineError::NoFileName(reject.to_path_buf());

        let mut candidate = dir.join(destination_name(reject, n).ok_or_else(no_name)?);
        let mut attempt = 1usize;
        while self.is_taken(&candidate) {
            attempt += 1;
            let name = suffixed_name(reject, &format!("_{n}_{attempt}")).ok_or_else(no_name)?;
            candidate = dir.join(name);
        }

        if attempt > 1 {
            log::warn!(
                "Destination for {} already taken, using {}",
                reject.display(),
                candidate.display()
            );
        }

        self.claimed.insert(candidate.clone());
        Ok(candidate)
    }

    fn is_taken(&self, candidate: &Path) -> bool {
        self.claimed.contains(candidate) || fs::symlink_metadata(candidate).is_ok()
    }
}

/// A fatal quarantine failure, with every relocation made before it.
#[derive(Debug, Error)]
#[error("quarantine stopped after {relocated} relocation(s)")]
pub struct QuarantineAbort {
    /// Outcomes in set order. The failing set is included when some of its
    /// rejects were already relocated.
    pub completed: Vec<QuarantineOutcome>,
    /// Number of rejects relocated before the failure.
    pub relocated: usize,
    /// The failure itself.
    #[source]
    pub source: QuarantineError,
}

/// Relocate every set in order, stopping at the first failure.
///
/// # Errors
///
/// Returns a [`QuarantineAbort`] holding the first [`QuarantineError`] and
/// the outcomes completed up to that point.
pub fn quarantine_all(
    sets: &[ResolvedSet],
    config: QuarantineConfig,
) -> Result<Vec<QuarantineOutcome>, QuarantineAbort> {
    let mut mover = QuarantineMover::new(config);
    let mut outcomes = Vec::with_capacity(sets.len());

    for set in sets {
        let mut relocations = Vec::with_capacity(set.rejects.len());
        let result = mover.relocate_into(set, &mut relocations);

        if result.is_ok() || !relocations.is_empty() {
            outcomes.push(mover.outcome(set, relocations));
        }
        if let Err(source) = result {
            log::error!(
                "Quarantine stopped after {} relocation(s): {}",
                mover.relocated(),
                source
            );
            return Err(QuarantineAbort {
                completed: outcomes,
                relocated: mover.relocated(),
                source,
            });
        }
    }

    log::info!(
        "Quarantine complete: {} reject(s) across {} set(s) ({})",
        mover.relocated(),
        outcomes.len(),
        mover.config().mode
    );
    Ok(outcomes)
}
