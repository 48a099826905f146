#![forbid(unsafe_code)]

//! # Verdict CLI
//!
//! Runs the bundled programs against their test data.
//!
//! ## Usage
//!
//! ```bash
//! verdict list                    # Show programs, signatures and test data
//! verdict run                     # Run every program
//! verdict run gcd --run-all       # Keep going after a failing row
//! verdict run --format json       # JSON lines for CI
//! ```
//!
//! Exit status is 0 when every row passed, 1 when a row failed or was not
//! run, and 2 when a run could not complete.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use verdict::silence_failure_panics;
use verdict_harness::cli::{Cli, Command, ListArgs, RunArgs};
use verdict_harness::harness::{
    FixtureLoader, LogLevel, Program, RunConfig, RunError, TEST_DATA_DIR_ENV, TestLogger,
    TestRunner, programs,
};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    silence_failure_panics();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Command::List(args) => {
            list(args)?;
            Ok(true)
        }
        Command::Run(args) => run_programs(args, cli.verbose),
    }
}

fn list(args: &ListArgs) -> anyhow::Result<()> {
    let config = RunConfig {
        test_data_dir: args.test_data_dir.clone(),
        ..RunConfig::default()
    };
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let env_dir = std::env::var_os(TEST_DATA_DIR_ENV).map(PathBuf::from);
    let loader = match config.resolve_test_data_dir(env_dir, &cwd) {
        Ok(dir) => Some(FixtureLoader::with_base_path(dir)),
        Err(err) if args.test_data_dir.is_some() => return Err(err.into()),
        Err(err) => {
            tracing::debug!(%err, "listing without test data");
            None
        }
    };

    for program in programs::all() {
        let handler = program.handler().map_err(|source| RunError::Handler {
            program: program.name.to_string(),
            source,
        })?;
        let missing = loader
            .as_ref()
            .is_some_and(|loader| !loader.exists(program.data_file));
        println!(
            "{:<16} {:<48} {}{}",
            program.name,
            handler.signature(),
            program.description,
            if missing { " [no test data]" } else { "" }
        );
    }

    if let Some(loader) = &loader {
        for name in loader.list() {
            if !programs::all().iter().any(|p| p.data_file == name) {
                println!("unused test data: {}", loader.data_path(&name).display());
            }
        }
    }
    Ok(())
}

fn select(names: &[String]) -> Result<Vec<&'static Program>, RunError> {
    if names.is_empty() {
        return Ok(programs::all().iter().collect());
    }
    names
        .iter()
        .map(|name| {
            programs::find(name).ok_or_else(|| RunError::UnknownProgram { name: name.clone() })
        })
        .collect()
}

fn run_programs(args: &RunArgs, verbosity: u8) -> anyhow::Result<bool> {
    let config = RunConfig::from_args(args, verbosity)?;
    tracing::debug!(config = %config.to_diagnostic_string(), "run configuration");

    let selected = select(&args.programs)?;
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let env_dir = std::env::var_os(TEST_DATA_DIR_ENV).map(PathBuf::from);
    let data_dir = config.resolve_test_data_dir(env_dir, &cwd)?;
    tracing::info!(dir = %data_dir.display(), programs = selected.len(), "starting run");

    let loader = FixtureLoader::with_base_path(&data_dir);
    let runner = TestRunner::new().with_run_all(config.run_all);
    let mut logger = TestLogger::new()
        .with_colors(config.colors)
        .with_level(LogLevel::from_verbosity(config.verbosity))
        .with_format(config.format)
        .with_timestamps(config.timestamps);

    let mut all_passed = true;
    for program in selected {
        let handler = program.handler().map_err(|source| RunError::Handler {
            program: program.name.to_string(),
            source,
        })?;
        let data = loader.load(program.data_file).map_err(RunError::from)?;

        logger.set_test_name(program.name);
        let summary = runner.run(handler.as_ref(), &data)?;
        for result in &summary.results {
            logger.log_row(result);
        }
        logger.log_summary(&summary);
        logger.clear_test_name();

        all_passed &= summary.all_passed();
    }

    Ok(all_passed)
}
