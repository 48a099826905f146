//! Test-data driven harness
//!
//! This module wires the core handler to files on disk:
//!
//! - [`FixtureLoader`]: Loading tab-separated test data
//! - [`RunConfig`]: Run options from TOML, environment and flags
//! - [`TestRunner`]: Running a handler over every row of a file
//! - [`Diff`]: Expected/actual diffs for failing rows
//! - [`TimingStats`]: Statistics over per-row invocation times
//! - [`TestLogger`]: Human or JSON-lines reporting
//! - [`programs`]: Registry of the bundled programs under test

mod benchmark;
mod comparison;
mod config;
mod fixtures;
mod logging;
pub mod programs;
mod runner;

pub use benchmark::TimingStats;
pub use comparison::{Diff, DiffType};
pub use config::{ConfigError, RunConfig, TEST_DATA_DIR_ENV, find_test_data_dir};
pub use fixtures::{
    EXPLANATION_COLUMN, FixtureError, FixtureLoader, FixtureResult, TEST_DATA_EXTENSION, TestData,
    TestRow,
};
pub use logging::{LogLevel, OutputFormat, TestLogger};
pub use programs::Program;
pub use runner::{RowResult, RunError, TestRunner, TestSummary};
