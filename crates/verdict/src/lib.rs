#![forbid(unsafe_code)]
// Allow pedantic lints that fight the generic dispatch code
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::type_complexity)]

//! # Verdict
//!
//! A typed, data-driven test-execution engine.
//!
//! Test data is textual: a header of type names followed by rows of value
//! tokens. Verdict checks the header against the compiled signature of the
//! function under test, parses every row into that function's argument types,
//! runs it under a timer and compares the result with the expected column.
//!
//! ## Example
//!
//! ```rust
//! use verdict::GenericTestHandler;
//!
//! fn reverse(mut values: Vec<i32>) -> Vec<i32> {
//!     values.reverse();
//!     values
//! }
//!
//! let handler = GenericTestHandler::new(reverse);
//! handler.parse_signature(&["array(int)", "array(int)"]).unwrap();
//!
//! let output = handler.run_test(&["[1, 2, 3]", "[3, 2, 1]"]).unwrap();
//! assert!(output.passed);
//! ```
//!
//! ## Failures vs. errors
//!
//! A row that produces the wrong value, or whose function raises
//! [`TestFailure`], is a failed row and the run can continue. Everything that
//! makes the test data untrustworthy (a header that does not match, a token
//! that does not parse, an unexpected panic) is a [`JudgeError`].
//!
//! ## Supported types
//!
//! | header token | Rust type |
//! |--------------|-----------|
//! | `void` | `()` |
//! | `bool` | `bool` |
//! | `int` | `i32` |
//! | `long` | `i64` |
//! | `float` | `f64` |
//! | `char` | `char` |
//! | `string` | `String` |
//! | `array(T)` | `Vec<T>` |
//! | `tuple(T1,...,Tn)` | `(T1, ..., Tn)`, n <= 4 |

pub mod args;
pub mod comparator;
pub mod error;
pub mod failure;
pub mod functional;
pub mod handler;
pub mod output;
pub mod serialization;
pub mod signature;
pub mod timer;
pub mod types;

pub use comparator::{ApproxComparator, Comparator, DefaultComparator, FnComparator, comparator};
pub use error::{JudgeError, Result};
pub use failure::{TestFailure, silence_failure_panics};
pub use functional::{ReturnKind, TestFunction};
pub use handler::{GenericTestHandler, RowHandler};
pub use output::{TestOutput, Verdict};
pub use serialization::{ParseError, Serialization};
pub use timer::{TestTimer, format_duration};
pub use types::{TypeDescriptor, TypeNameError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        ApproxComparator, Comparator, DefaultComparator, GenericTestHandler, JudgeError,
        RowHandler, TestFailure, TestOutput, Verdict, comparator,
    };
}
