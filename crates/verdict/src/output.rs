//! The verdict of a single row.

use std::fmt::Debug;
use std::time::Duration;

use serde::Serialize;

use crate::failure::TestFailure;
use crate::timer::TestTimer;

/// Typed result of [`GenericTestHandler::run_test`].
///
/// `expected` and `actual` are only present for value-returning functions.
/// When the function raised [`TestFailure`], `expected` is kept (if any),
/// `actual` is absent and `failure` holds the signal.
///
/// [`GenericTestHandler::run_test`]: crate::handler::GenericTestHandler::run_test
#[derive(Debug, Clone, PartialEq)]
pub struct TestOutput<E, R> {
    pub passed: bool,
    pub timer: TestTimer,
    pub expected: Option<E>,
    pub actual: Option<R>,
    pub failure: Option<TestFailure>,
}

impl<E, R> TestOutput<E, R> {
    /// A void function that returned normally.
    pub fn void(timer: TestTimer) -> Self {
        Self {
            passed: true,
            timer,
            expected: None,
            actual: None,
            failure: None,
        }
    }

    /// A value-returning function whose result went through the comparator.
    pub fn compared(passed: bool, timer: TestTimer, expected: E, actual: R) -> Self {
        Self {
            passed,
            timer,
            expected: Some(expected),
            actual: Some(actual),
            failure: None,
        }
    }

    /// The function raised the failure signal.
    pub fn failed(timer: TestTimer, expected: Option<E>, failure: TestFailure) -> Self {
        Self {
            passed: false,
            timer,
            expected,
            actual: None,
            failure: Some(failure),
        }
    }

    /// Time spent inside the function under test.
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }
}

impl<E: Debug, R: Debug> TestOutput<E, R> {
    /// Erase the value types, rendering both sides with `Debug`.
    pub fn into_verdict(self) -> Verdict {
        Verdict {
            passed: self.passed,
            elapsed: self.timer.elapsed(),
            expected: self.expected.map(|e| format!("{e:?}")),
            actual: self.actual.map(|a| format!("{a:?}")),
            failure: self.failure,
        }
    }
}

/// Type-erased verdict consumed by drivers that hold handlers of mixed types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    pub elapsed: Duration,
    pub expected: Option<String>,
    pub actual: Option<String>,
    #[serde(serialize_with = "serialize_failure")]
    pub failure: Option<TestFailure>,
}

fn serialize_failure<S>(failure: &Option<TestFailure>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match failure {
        Some(failure) => serializer.serialize_some(&failure.to_string()),
        None => serializer.serialize_none(),
    }
}
