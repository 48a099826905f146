//! Command-line interface for the `verdict` binary.
//!
//! # Examples
//!
//! ```bash
//! # List the bundled programs
//! verdict list
//!
//! # Run every program against the bundled test data
//! verdict run
//!
//! # Run two programs through all rows, reporting JSON lines
//! verdict run add gcd --run-all --format json
//!
//! # Point at another test-data directory
//! verdict run --test-data-dir ./my_data -vv
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::harness::OutputFormat;

/// Typed, data-driven test runner.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "verdict",
    author,
    version,
    about = "Run functions under test against tab-separated test data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (repeat for more)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List registered programs and their signatures
    List(ListArgs),

    /// Run programs against their test data
    Run(RunArgs),
}

/// Arguments for the list subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ListArgs {
    /// Directory checked for `<program>.tsv` files
    ///
    /// Without it the directory is looked up as for `run`; listing still
    /// works when none is found
    #[arg(long, short = 'd')]
    pub test_data_dir: Option<PathBuf>,
}

/// Arguments for the run subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Programs to run (all when none given)
    pub programs: Vec<String>,

    /// Directory holding `<program>.tsv` files
    ///
    /// Falls back to `VERDICT_TEST_DATA_DIR`, then to the nearest
    /// `test_data` directory above the working directory
    #[arg(long, short = 'd')]
    pub test_data_dir: Option<PathBuf>,

    /// TOML file with run options
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Keep running after the first failing row
    #[arg(long, short = 'a')]
    pub run_all: bool,

    /// Report format
    #[arg(long, short = 'f')]
    pub format: Option<FormatArg>,

    /// Force color output off
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Report formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    Human,
    /// One JSON object per line
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Human => Self::Human,
            FormatArg::Json => Self::Json,
        }
    }
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Filter directive for `tracing-subscriber` based on verbosity.
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
