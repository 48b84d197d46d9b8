//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, else `<platform config dir>/photodedupe/config.toml`)
//! 3. Environment variables prefixed with `PHOTODEDUPE_` (e.g. `PHOTODEDUPE_IO_THREADS=4`)
//! 4. Command-line flags
//!
//! ```toml
//! extensions = ["jpg", "nef", "mov"]
//! quarantine_dir = "_Rejected"
//! placement = "beside-original"
//! io_threads = 1
//! output = "text"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::{QuarantineConfig, QuarantinePlacement, RunMode};
use crate::cli::{Cli, OutputFormat};
use crate::scanner::{ExtensionFilter, WalkerConfig, DEFAULT_EXTENSIONS, DEFAULT_QUARANTINE_DIR};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "PHOTODEDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extensions compared (case-insensitive, with or without leading dot).
    pub extensions: Vec<String>,
    /// Name of the quarantine folder.
    pub quarantine_dir: String,
    /// Where quarantine folders are placed.
    pub placement: QuarantinePlacement,
    /// Threads used for hashing; 1 hashes sequentially.
    pub io_threads: usize,
    /// Minimum file size in bytes.
    pub min_size: Option<u64>,
    /// Maximum file size in bytes.
    pub max_size: Option<u64>,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            quarantine_dir: DEFAULT_QUARANTINE_DIR.to_string(),
            placement: QuarantinePlacement::default(),
            io_threads: 1,
            min_size: None,
            max_size: None,
            output: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Load the configuration, reading `path` instead of the default file if given.
    ///
    /// A missing file is skipped. An unreadable or invalid one falls back to
    /// defaults with a warning.
    #[must_use]
    pub fn load_from_path(path: Option<&Path>) -> Self {
        let file = path.map(Path::to_path_buf).or_else(Self::config_path);

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref file) = file {
            if file.exists() {
                log::debug!("Reading configuration from {}", file.display());
                figment = figment.merge(Toml::file(file));
            } else if path.is_some() {
                log::warn!("Configuration file not found: {}", file.display());
            }
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "photodedupe", "photodedupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line flags on top of the loaded configuration.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if !cli.extensions.is_empty() {
            self.extensions.clone_from(&cli.extensions);
        }
        if let Some(ref name) = cli.quarantine_dir {
            self.quarantine_dir.clone_from(name);
        }
        if cli.beside_reject {
            self.placement = QuarantinePlacement::BesideReject;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = usize::from(threads);
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
    }

    /// Check values that cannot be expressed in the types.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        let name = self.quarantine_dir.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(format!(
                "Quarantine folder must be a plain folder name, got '{}'",
                self.quarantine_dir
            ));
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(format!("min_size ({min}) is greater than max_size ({max})"));
            }
        }
        if self.extension_filter().is_empty() {
            return Err("Extension list is empty, nothing would be compared".to_string());
        }
        Ok(())
    }

    /// The extension allow-list.
    #[must_use]
    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(&self.extensions)
    }

    /// Traversal settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_extensions(self.extension_filter())
            .with_quarantine_dir_name(self.quarantine_dir.clone())
            .with_size_bounds(self.min_size, self.max_size)
    }

    /// Quarantine settings derived from this configuration.
    #[must_use]
    pub fn quarantine_config(&self, mode: RunMode) -> QuarantineConfig {
        QuarantineConfig::default()
            .with_mode(mode)
            .with_placement(self.placement)
            .with_dir_name(self.quarantine_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.io_threads, 1);
        assert_eq!(config.quarantine_dir, "_Rejected");
        assert_eq!(config.extensions.len(), DEFAULT_EXTENSIONS.len());
    }

    #[test]
    fn test_merge_cli_overrides() {
        let cli = Cli::try_parse_from([
            "photodedupe",
            "/p",
            "--ext",
            "png",
            "--quarantine-dir",
            "_Dupes",
            "--beside-reject",
            "--io-threads",
            "3",
            "--min-size",
            "10",
            "--output",
            "json",
        ])
        .unwrap();

        let mut config = Config::default();
        config.max_size = Some(1000);
        config.merge_cli(&cli);

        assert_eq!(config.extensions, vec!["png"]);
        assert_eq!(config.quarantine_dir, "_Dupes");
        assert_eq!(config.placement, QuarantinePlacement::BesideReject);
        assert_eq!(config.io_threads, 3);
        assert_eq!(config.min_size, Some(10));
        assert_eq!(config.max_size, Some(1000));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_merge_cli_keeps_config_when_flags_absent() {
        let cli = Cli::try_parse_from(["photodedupe", "/p"]).unwrap();
        let mut config = Config {
            io_threads: 8,
            placement: QuarantinePlacement::BesideReject,
            ..Config::default()
        };
        config.merge_cli(&cli);

        assert_eq!(config.io_threads, 8);
        assert_eq!(config.placement, QuarantinePlacement::BesideReject);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let nested = Config {
            quarantine_dir: "a/b".to_string(),
            ..Config::default()
        };
        assert!(nested.validate().is_err());

        let inverted = Config {
            min_size: Some(10),
            max_size: Some(5),
            ..Config::default()
        };
        assert!(inverted.validate().is_err());

        let empty = Config {
            extensions: vec![".".to_string()],
            ..Config::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_derived_configs() {
        let config = Config {
            quarantine_dir: "_Dupes".to_string(),
            min_size: Some(1),
            ..Config::default()
        };

        let walker = config.walker_config();
        assert_eq!(walker.quarantine_dir_name, "_Dupes");
        assert_eq!(walker.min_size, Some(1));

        let quarantine = config.quarantine_config(RunMode::Live);
        assert_eq!(quarantine.dir_name, "_Dupes");
        assert!(quarantine.mode.is_live());
    }
}
