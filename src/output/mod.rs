//! Output formatters for run reports.
//!
//! This module provides two output formats:
//! - Text for people at a terminal
//! - JSON for automation and scripting
//!
//! Both render the same [`RunReport`].
//!
//! # Example
//!
//! ```no_run
//! use photodedupe::actions::{quarantine_all, QuarantineConfig};
//! use photodedupe::duplicates::{resolve_all, DuplicateFinder};
//! use photodedupe::error::ExitCode;
//! use photodedupe::output::{json::JsonOutput, RunReport};
//! use std::path::Path;
//!
//! let (sets, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! let resolved = resolve_all(&sets);
//! let config = QuarantineConfig::default();
//! let outcomes = quarantine_all(&resolved, config.clone()).unwrap();
//!
//! let report = RunReport::new(&config, &resolved, &outcomes, &summary);
//! println!("{}", JsonOutput::new(&report, ExitCode::Success).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextReport;

use crate::actions::{QuarantineConfig, QuarantineOutcome, RunMode};
use crate::duplicates::{ResolvedSet, ScanSummary};

/// Everything a report needs about one run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport<'a> {
    /// Simulation or live.
    pub mode: RunMode,
    /// Name of the quarantine folder.
    pub quarantine_dir: &'a str,
    /// Resolved sets in presentation order.
    pub sets: &'a [ResolvedSet],
    /// Quarantine outcome for each set, same order as `sets`.
    pub outcomes: &'a [QuarantineOutcome],
    /// Scan statistics and collected traversal errors.
    pub summary: &'a ScanSummary,
}

impl<'a> RunReport<'a> {
    /// Bundle the results of a run.
    #[must_use]
    pub fn new(
        config: &'a QuarantineConfig,
        sets: &'a [ResolvedSet],
        outcomes: &'a [QuarantineOutcome],
        summary: &'a ScanSummary,
    ) -> Self {
        Self {
            mode: config.mode,
            quarantine_dir: &config.dir_name,
            sets,
            outcomes,
            summary,
        }
    }

    /// Sets paired with their outcomes.
    pub fn entries(&self) -> impl Iterator<Item = (&'a ResolvedSet, &'a QuarantineOutcome)> {
        self.sets.iter().zip(self.outcomes.iter())
    }

    /// Number of rejects relocated or planned.
    #[must_use]
    pub fn relocation_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.relocations.len()).sum()
    }
}
