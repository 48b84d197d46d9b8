//! Human-readable report.
//!
//! ```text
//! Traversal errors (1):
//!   Permission denied: /photos/locked
//!
//! Simulation mode: no files were moved (use --live to apply)
//!
//! /photos/2020-01-01/img.jpg
//!   /photos/2020-01-01/copy/img.jpg -> /photos/2020-01-01/_Rejected/img_1.jpg
//!
//! Scanned 3 files (1.5 KiB), 2 compared by content
//! 1 duplicate set, 1 reject would be moved, 500 B reclaimable
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use super::RunReport;

/// Text formatter for a run report.
#[derive(Debug)]
pub struct TextReport<'a> {
    report: RunReport<'a>,
}

impl<'a> TextReport<'a> {
    /// Wrap a report for text output.
    #[must_use]
    pub fn new(report: RunReport<'a>) -> Self {
        Self { report }
    }

    /// Write the full report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.write_errors(writer)?;
        self.write_mode(writer)?;
        self.write_sets(writer)?;
        self.write_summary(writer)
    }

    /// Render the full report to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn render(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_errors<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let errors = &self.report.summary.scan_errors;
        if errors.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{}", format!("Traversal errors ({}):", errors.len()).yellow())?;
        for error in errors {
            writeln!(writer, "  {error}")?;
        }
        writeln!(writer)
    }

    fn write_mode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.report.mode.is_live() {
            return Ok(());
        }
        writeln!(
            writer,
            "{}",
            "Simulation mode: no files were moved (use --live to apply)".cyan()
        )?;
        writeln!(writer)
    }

    fn write_sets<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (_, outcome) in self.report.entries() {
            writeln!(writer, "{}", outcome.original.display().bold())?;
            for relocation in &outcome.relocations {
                writeln!(
                    writer,
                    "  {} -> {}",
                    relocation.from.display().red(),
                    relocation.to.display()
                )?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let summary = self.report.summary;
        let rejects = self.report.relocation_count();
        let verb = if self.report.mode.is_live() {
            "moved"
        } else {
            "would be moved"
        };

        writeln!(
            writer,
            "Scanned {} files ({}), {} compared by content",
            summary.total_files,
            ByteSize::b(summary.total_size),
            summary.candidates
        )?;
        writeln!(
            writer,
            "{} duplicate {}, {} reject{} {}, {} reclaimable",
            self.report.sets.len().red(),
            plural(self.report.sets.len(), "set", "sets"),
            rejects.red(),
            if rejects == 1 { "" } else { "s" },
            verb,
            ByteSize::b(summary.reclaimable_space).green()
        )
    }
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}
