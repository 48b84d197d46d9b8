//! File actions module.
//!
//! This module provides the quarantine mover: rejects of every resolved
//! duplicate set are renamed into a fixed-name folder instead of being
//! deleted, so every decision can be reviewed and undone by hand.
//!
//! ```no_run
//! use photodedupe::actions::{quarantine_all, QuarantineConfig, RunMode};
//!
//! let outcomes = quarantine_all(&[], QuarantineConfig::default().with_mode(RunMode::Simulate));
//! ```

pub mod quarantine;

pub use quarantine::{
    destination_name, quarantine_all, QuarantineAbort, QuarantineConfig, QuarantineError,
    QuarantineMover, QuarantineOutcome, QuarantinePlacement, Relocation, RunMode,
};
