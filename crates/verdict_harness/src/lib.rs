#![forbid(unsafe_code)]
// Allow pedantic lints that mostly flag reporting code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

//! # Verdict Harness
//!
//! Drives [`verdict`] handlers over test data on disk.
//!
//! Test data is one tab-separated file per program: a header of type names,
//! then one row per case. The harness loads the file, checks the header
//! against the program's handler, runs the rows and reports failures with
//! expected/actual values, a diff and timing statistics.
//!
//! ## Example
//!
//! ```rust,no_run
//! use verdict_harness::harness::{FixtureLoader, TestRunner, programs};
//!
//! let loader = FixtureLoader::bundled();
//! let program = programs::find("gcd").unwrap();
//! let handler = program.handler().unwrap();
//! let data = loader.load(program.data_file).unwrap();
//!
//! let summary = TestRunner::new().run(handler.as_ref(), &data).unwrap();
//! assert!(summary.all_passed());
//! ```

pub mod cli;
pub mod harness;
