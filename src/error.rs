//! Structured error handling and exit codes.

use std::fmt;

use serde::Serialize;

use crate::cli::OutputFormat;

/// Exit codes for the photodedupe application.
///
/// - 0: Success (completed normally, with or without duplicates)
/// - 1: General error (any fatal condition: unreadable candidate, failed move)
/// - 3: Partial success (completed, but some directories could not be read)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed.
    Success = 0,
    /// General error: the run was aborted.
    GeneralError = 1,
    /// Partial success: the run completed with traversal errors.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "PD000",
            Self::GeneralError => "PD001",
            Self::PartialSuccess => "PD003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "PD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}

/// A fatal application error and the output format in effect when it
/// happened, so it can be printed the same way as the report.
#[derive(Debug)]
pub struct AppError {
    /// Output format from the merged configuration
    pub output: OutputFormat,
    /// The error, with context
    pub error: anyhow::Error,
}

impl AppError {
    /// Wrap an error with the format it should be reported in.
    #[must_use]
    pub fn new(output: OutputFormat, error: anyhow::Error) -> Self {
        Self { output, error }
    }

    /// Structured form of this error.
    #[must_use]
    pub fn structured(&self, exit_code: ExitCode) -> StructuredError {
        StructuredError::new(&self.error, exit_code)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&*self.error)
    }
}
