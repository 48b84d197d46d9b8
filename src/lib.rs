//! photodedupe - duplicate photo and media finder
//!
//! Finds byte-identical files under a directory (size first, then a full
//! content digest), keeps the copy with the shortest path in each set and
//! moves every other copy into a `_Rejected` folder. Simulation is the
//! default; nothing is moved without `--live`.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{quarantine_all, QuarantineConfig, QuarantineOutcome, RunMode};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{
    resolve_all, DuplicateFinder, FinderConfig, FinderError, ResolvedSet, ScanSummary,
};
use crate::error::{AppError, ExitCode};
use crate::output::{JsonOutput, RunReport, TextReport};
use crate::progress::{Progress, ProgressCallback};

/// Everything produced by one run of the pipeline.
#[derive(Debug)]
pub struct RunResult {
    /// Quarantine settings used.
    pub quarantine: QuarantineConfig,
    /// Resolved sets in presentation order.
    pub sets: Vec<ResolvedSet>,
    /// Quarantine outcome per set.
    pub outcomes: Vec<QuarantineOutcome>,
    /// Scan statistics and traversal errors.
    pub summary: ScanSummary,
}

impl RunResult {
    /// View for the output formatters.
    #[must_use]
    pub fn report(&self) -> RunReport<'_> {
        RunReport::new(&self.quarantine, &self.sets, &self.outcomes, &self.summary)
    }

    /// Exit code for a completed run.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.summary.has_errors() {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}

/// A run stopped by a fatal error after it had started producing results.
///
/// `partial` holds what was gathered before the failure: traversal errors
/// when hashing failed, and every completed relocation when quarantine
/// failed.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RunAborted {
    message: String,
    /// Results gathered before the failure.
    pub partial: Box<RunResult>,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl RunAborted {
    fn new(
        message: String,
        partial: RunResult,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message,
            partial: Box::new(partial),
            source: source.into(),
        }
    }
}

/// Scan, resolve and quarantine under `root`.
///
/// # Errors
///
/// Fails if the root is not a readable directory, any candidate cannot be
/// hashed, or any quarantine folder or move fails. Failures after traversal
/// started are [`RunAborted`] errors carrying the partial results.
pub fn run(
    root: &Path,
    config: &Config,
    mode: RunMode,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> anyhow::Result<RunResult> {
    let mut finder_config = FinderConfig::default()
        .with_walker_config(config.walker_config())
        .with_io_threads(config.io_threads);
    if let Some(progress) = progress {
        finder_config = finder_config.with_progress_callback(progress);
    }
    let quarantine = config.quarantine_config(mode);

    let (duplicate_sets, summary) = match DuplicateFinder::new(finder_config).find_duplicates(root)
    {
        Ok(found) => found,
        Err(FinderError::Hash {
            source,
            scan_errors,
        }) => {
            let partial = RunResult {
                quarantine,
                sets: Vec::new(),
                outcomes: Vec::new(),
                summary: ScanSummary {
                    scan_errors,
                    ..ScanSummary::default()
                },
            };
            let message = format!("Scan of {} aborted", root.display());
            return Err(RunAborted::new(message, partial, source).into());
        }
        Err(e) => {
            let message = format!("Scan of {} aborted", root.display());
            return Err(anyhow::Error::new(e).context(message));
        }
    };

    let sets = resolve_all(&duplicate_sets);

    log::info!(
        "Quarantining {} reject(s) from {} set(s) ({} mode)",
        summary.duplicate_files,
        sets.len(),
        mode
    );
    match quarantine_all(&sets, quarantine.clone()) {
        Ok(outcomes) => Ok(RunResult {
            quarantine,
            sets,
            outcomes,
            summary,
        }),
        Err(mut abort) => {
            let partial = RunResult {
                quarantine,
                sets,
                outcomes: std::mem::take(&mut abort.completed),
                summary,
            };
            let message = "Quarantine aborted, earlier moves were kept".to_string();
            Err(RunAborted::new(message, partial, abort).into())
        }
    }
}

fn write_report(
    result: &RunResult,
    format: OutputFormat,
    exit_code: ExitCode,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => TextReport::new(result.report())
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&result.report(), exit_code)
            .write_to(&mut out, true)
            .context("Failed to write JSON report")?,
    }
    out.flush().context("Failed to write report")
}

/// Run the command line application.
///
/// # Errors
///
/// Returns any fatal error of the run, with context naming the failing path,
/// together with the output format in effect. If the run was aborted after
/// producing results, the partial report is written before returning.
pub fn run_app(cli: Cli) -> Result<ExitCode, AppError> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    let mut config = Config::load_from_path(cli.config.as_deref());
    config.merge_cli(&cli);
    let output = config.output;

    run_configured(&cli, &config).map_err(|error| AppError::new(output, error))
}

fn run_configured(cli: &Cli, config: &Config) -> anyhow::Result<ExitCode> {
    config.validate().map_err(anyhow::Error::msg)?;
    log::debug!("Effective configuration: {:?}", config);

    let mode = if cli.live {
        RunMode::Live
    } else {
        RunMode::Simulate
    };

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(cli.quiet));
    let result = match run(&cli.path, config, mode, Some(progress)) {
        Ok(result) => result,
        Err(err) => {
            if let Some(aborted) = err.downcast_ref::<RunAborted>() {
                if let Err(e) = write_report(&aborted.partial, config.output, ExitCode::GeneralError)
                {
                    log::warn!("Could not write partial report: {:#}", e);
                }
            }
            return Err(err);
        }
    };

    let exit_code = result.exit_code();
    write_report(&result, config.output, exit_code)?;
    Ok(exit_code)
}
