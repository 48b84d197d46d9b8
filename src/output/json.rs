//! JSON output formatter for run reports.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "mode": "simulate",
//!   "quarantine_dir": "_Rejected",
//!   "sets": [
//!     {
//!       "digest": "3f1c...",
//!       "size": 500,
//!       "original": "/photos/2020-01-01/img.jpg",
//!       "rejects": [
//!         { "from": "/photos/2020-01-01/copy/img.jpg", "to": "/photos/2020-01-01/_Rejected/img_1.jpg" }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "total_size": 1500,
//!     "eliminated_by_size": 1,
//!     "candidates": 2,
//!     "duplicate_sets": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_space": 500,
//!     "applied": false,
//!     "scan_duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "PD000"
//!   },
//!   "errors": [ { "path": "/photos/locked", "message": "Permission denied: /photos/locked" } ]
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::RunReport;
use crate::actions::{Relocation, RunMode};
use crate::duplicates::ScanSummary;
use crate::error::ExitCode;
use crate::scanner::{hash_to_hex, ScanError};

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateSet {
    /// Content digest as hexadecimal string (40 characters)
    pub digest: String,
    /// File size in bytes
    pub size: u64,
    /// The copy that was kept
    pub original: String,
    /// Every other copy and its quarantine destination
    pub rejects: Vec<JsonRelocation>,
}

/// One reject in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRelocation {
    /// Path before the move
    pub from: String,
    /// Path inside the quarantine folder
    pub to: String,
}

impl From<&Relocation> for JsonRelocation {
    fn from(relocation: &Relocation) -> Self {
        Self {
            from: relocation.from.to_string_lossy().into_owned(),
            to: relocation.to.to_string_lossy().into_owned(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of candidate files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Files compared by content
    pub candidates: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Total number of rejects
    pub duplicate_files: usize,
    /// Bytes freed by quarantining every reject
    pub reclaimable_space: u64,
    /// Whether the moves were performed
    pub applied: bool,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "PD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, mode: RunMode, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            candidates: summary.candidates,
            duplicate_sets: summary.duplicate_sets,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            applied: mode.is_live(),
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A traversal error in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonScanError {
    /// Path that could not be read
    pub path: String,
    /// Human-readable message
    pub message: String,
}

impl From<&ScanError> for JsonScanError {
    fn from(error: &ScanError) -> Self {
        Self {
            path: error.path().to_string_lossy().into_owned(),
            message: error.to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Run mode
    pub mode: RunMode,
    /// Quarantine folder name
    pub quarantine_dir: String,
    /// Duplicate sets in presentation order
    pub sets: Vec<JsonDuplicateSet>,
    /// Scan summary statistics
    pub summary: JsonSummary,
    /// Traversal errors
    pub errors: Vec<JsonScanError>,
}

impl JsonOutput {
    /// Create a new JSON output from a run report and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use photodedupe::actions::QuarantineConfig;
    /// use photodedupe::duplicates::ScanSummary;
    /// use photodedupe::error::ExitCode;
    /// use photodedupe::output::{json::JsonOutput, RunReport};
    ///
    /// let config = QuarantineConfig::default();
    /// let summary = ScanSummary::default();
    /// let report = RunReport::new(&config, &[], &[], &summary);
    ///
    /// let output = JsonOutput::new(&report, ExitCode::Success);
    /// assert!(output.sets.is_empty());
    /// assert!(output.to_json().unwrap().starts_with('{'));
    /// ```
    #[must_use]
    pub fn new(report: &RunReport<'_>, exit_code: ExitCode) -> Self {
        Self {
            mode: report.mode,
            quarantine_dir: report.quarantine_dir.to_string(),
            sets: report
                .entries()
                .map(|(set, outcome)| JsonDuplicateSet {
                    digest: hash_to_hex(&set.digest),
                    size: set.size,
                    original: outcome.original.to_string_lossy().into_owned(),
                    rejects: outcome.relocations.iter().map(JsonRelocation::from).collect(),
                })
                .collect(),
            summary: JsonSummary::from_scan_summary(report.summary, report.mode, exit_code),
            errors: report
                .summary
                .scan_errors
                .iter()
                .map(JsonScanError::from)
                .collect(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
