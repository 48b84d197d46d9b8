//! Progress reporting utilities using indicatif.
//!
//! The pipeline never prints. It sends discrete events to a
//! [`ProgressCallback`]; [`Progress`] turns them into terminal progress bars.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Phase name for size classification (runs during traversal).
pub const PHASE_SIZE: &str = "size";
/// Phase name for content hashing.
pub const PHASE_HASH: &str = "hash";

/// Outcome of processing a single item, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// First file seen with this size or digest.
    FirstSeen,
    /// Size or digest already seen: a (potential) duplicate.
    Match,
    /// The item could not be processed.
    Error,
}

/// Progress callback for duplicate finding phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_SIZE`] or [`PHASE_HASH`])
    /// * `total` - Total number of items to process, 0 if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called once for each processed item.
    fn on_item(&self, status: ItemStatus);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    matches: AtomicUsize,
    errors: AtomicUsize,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// ```
    /// use photodedupe::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            matches: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            quiet,
        }
    }

    /// Spinner used while traversal feeds the size classifier.
    fn size_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {prefix} [{elapsed_precise}] {pos} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    /// Bar used while hashing candidates.
    fn hash_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn counters_message(&self) -> String {
        format!(
            "{} matches, {} errors",
            self.matches.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed)
        )
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        self.matches.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);

        let pb = match phase {
            PHASE_SIZE => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::size_style());
                pb.set_prefix("Comparing sizes");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            _ => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(Self::hash_style());
                pb.set_prefix("Comparing content");
                pb
            }
        };

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_item(&self, status: ItemStatus) {
        match status {
            ItemStatus::Match => {
                self.matches.fetch_add(1, Ordering::Relaxed);
            }
            ItemStatus::Error => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
            ItemStatus::FirstSeen => {}
        }

        if self.quiet {
            return;
        }

        if let Ok(slot) = self.bar.lock() {
            if let Some(ref pb) = *slot {
                pb.inc(1);
                pb.set_message(self.counters_message());
            }
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        if self.quiet {
            return;
        }

        if let Ok(mut slot) = self.bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_with_message(self.counters_message());
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Ok(slot) = self.bar.lock() {
            if let Some(ref pb) = *slot {
                pb.set_message(message.to_string());
            }
        }
    }
}
