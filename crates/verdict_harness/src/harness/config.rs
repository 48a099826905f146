//! Run configuration.
//!
//! [`RunConfig`] holds every run option regardless of where it came from.
//! Values load from a TOML file, then command-line flags override them:
//!
//! ```toml
//! test_data_dir = "test_data"
//! run_all = true
//! format = "json"
//! colors = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::logging::OutputFormat;
use crate::cli::RunArgs;

/// Environment variable naming the test-data directory.
pub const TEST_DATA_DIR_ENV: &str = "VERDICT_TEST_DATA_DIR";

/// Directory name searched for when no location is configured.
const TEST_DATA_DIR_NAME: &str = "test_data";

/// Options for one invocation of the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Directory holding `<program>.tsv` files.
    pub test_data_dir: Option<PathBuf>,

    /// Keep running after the first failing row.
    pub run_all: bool,

    /// Report format.
    pub format: OutputFormat,

    /// Whether colored output is allowed.
    pub colors: bool,

    /// Whether report lines carry timestamps.
    pub timestamps: bool,

    /// Log verbosity level (0=warn, 1=info, 2=debug, 3+=trace).
    pub verbosity: u8,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            test_data_dir: None,
            run_all: false,
            format: OutputFormat::Human,
            colors: true,
            timestamps: false,
            verbosity: 0,
        }
    }
}

impl RunConfig {
    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a TOML file. A relative `test_data_dir` is taken relative to the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(dir) = config.test_data_dir.take() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.test_data_dir = Some(if dir.is_relative() { base.join(dir) } else { dir });
        }

        debug!(path = %path.display(), "loaded run configuration");
        Ok(config)
    }

    /// Build from the `run` subcommand: config file first, flags on top.
    pub fn from_args(args: &RunArgs, verbosity: u8) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_args(args, verbosity);
        Ok(config)
    }

    /// Override with values given on the command line.
    pub fn apply_args(&mut self, args: &RunArgs, verbosity: u8) {
        if let Some(dir) = &args.test_data_dir {
            self.test_data_dir = Some(dir.clone());
        }
        if args.run_all {
            self.run_all = true;
        }
        if let Some(format) = args.format {
            self.format = format.into();
        }
        if args.no_color {
            self.colors = false;
        }
        if verbosity > 0 {
            self.verbosity = verbosity;
        }
    }

    /// Locate the test-data directory.
    ///
    /// Order: the configured directory, then `env_value` (the contents of
    /// [`TEST_DATA_DIR_ENV`]), then the nearest `test_data` directory at or
    /// above `cwd`.
    pub fn resolve_test_data_dir(
        &self,
        env_value: Option<PathBuf>,
        cwd: &Path,
    ) -> Result<PathBuf, ConfigError> {
        let explicit = self
            .test_data_dir
            .clone()
            .or_else(|| env_value.filter(|p| !p.as_os_str().is_empty()));

        if let Some(dir) = explicit {
            let dir = if dir.is_relative() { cwd.join(dir) } else { dir };
            return if dir.is_dir() {
                Ok(dir)
            } else {
                Err(ConfigError::TestDataDirMissing(dir))
            };
        }

        find_test_data_dir(cwd).ok_or_else(|| ConfigError::TestDataDirNotFound(cwd.to_path_buf()))
    }

    /// Export configuration as a diagnostic string.
    pub fn to_diagnostic_string(&self) -> String {
        let mut lines = Vec::new();
        match &self.test_data_dir {
            Some(dir) => lines.push(format!("Test data: {}", dir.display())),
            None => lines.push("Test data: (search)".to_string()),
        }
        lines.push(format!("Run all: {}", self.run_all));
        lines.push(format!("Format: {:?}", self.format));
        lines.push(format!("Colors: {}", if self.colors { "on" } else { "off" }));
        lines.push(format!("Timestamps: {}", if self.timestamps { "on" } else { "off" }));
        lines.push(format!("Verbosity: {}", self.verbosity));
        lines.join("\n")
    }
}

/// Nearest `test_data` directory at or above `start`.
pub fn find_test_data_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(TEST_DATA_DIR_NAME))
        .find(|candidate| candidate.is_dir())
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The configured directory does not exist.
    #[error("test data directory not found: {}", .0.display())]
    TestDataDirMissing(PathBuf),

    /// No `test_data` directory above the working directory.
    #[error("no test_data directory found at or above {}", .0.display())]
    TestDataDirNotFound(PathBuf),
}
