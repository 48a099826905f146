//! TestRunner - Driving a handler over a test-data file
//!
//! Checks the header once, then runs rows in file order. By default the run
//! stops at the first failing row; `run_all` keeps going. Fatal errors from
//! the handler abort the run with the offending line attached.

use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, warn};
use verdict::{JudgeError, RowHandler, Verdict};

use super::benchmark::TimingStats;
use super::comparison::Diff;
use super::fixtures::{FixtureError, TestData, TestRow};

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    /// The header does not describe the function under test
    #[error("{program}: test data does not match the function signature: {source}")]
    Signature {
        program: String,
        #[source]
        source: JudgeError,
    },

    /// A row could not be executed
    #[error("{program}: line {line}: {source}")]
    Row {
        program: String,
        line: usize,
        #[source]
        source: JudgeError,
    },

    /// The handler could not be built
    #[error("{program}: {source}")]
    Handler {
        program: String,
        #[source]
        source: JudgeError,
    },

    /// No program with that name is registered
    #[error("unknown program `{name}`")]
    UnknownProgram { name: String },

    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

fn serialize_micros<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(elapsed.as_micros())
}

/// Result of a single row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowResult {
    /// 1-based line in the test-data file
    pub line: usize,
    /// Argument tokens as written in the file
    pub arguments: Vec<String>,
    pub passed: bool,
    /// Time spent inside the function under test
    #[serde(rename = "elapsed_us", serialize_with = "serialize_micros")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    /// Rendered failure signal, if the function raised one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl RowResult {
    fn from_verdict(row: &TestRow, arity: usize, verdict: Verdict) -> Self {
        Self {
            line: row.line,
            arguments: row.tokens.iter().take(arity).cloned().collect(),
            passed: verdict.passed,
            elapsed: verdict.elapsed,
            expected: verdict.expected,
            actual: verdict.actual,
            failure: verdict.failure.map(|f| f.to_string()),
            explanation: row.explanation.clone(),
        }
    }

    /// Diff of expected vs. actual, when both are present and differ
    pub fn diff(&self) -> Option<Diff> {
        match (&self.expected, &self.actual) {
            (Some(expected), Some(actual)) => Diff::between(expected, actual),
            _ => None,
        }
    }
}

/// Summary of one program's run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TestSummary {
    pub program: String,
    /// Rows in the test-data file
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Per-row results, in execution order
    pub results: Vec<RowResult>,
    /// Invocation times of passing rows
    pub timing: Option<TimingStats>,
}

impl TestSummary {
    fn new(program: &str, total: usize) -> Self {
        Self {
            program: program.to_string(),
            total,
            ..Self::default()
        }
    }

    fn record(&mut self, result: RowResult) {
        if result.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    fn finish(&mut self) {
        let samples: Vec<Duration> = self
            .results
            .iter()
            .filter(|r| r.passed)
            .map(|r| r.elapsed)
            .collect();
        self.timing = TimingStats::from_samples(&samples);
    }

    /// Rows skipped because the run stopped early
    pub fn not_run(&self) -> usize {
        self.total.saturating_sub(self.passed + self.failed)
    }

    /// True when every row ran and passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.not_run() == 0
    }

    /// Failing rows
    pub fn failures(&self) -> impl Iterator<Item = &RowResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}

/// Runner for one handler over one test-data file
#[derive(Debug, Clone, Copy, Default)]
pub struct TestRunner {
    run_all: bool,
}

impl TestRunner {
    /// Runner that stops at the first failing row
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep running after a failing row
    pub fn with_run_all(mut self, run_all: bool) -> Self {
        self.run_all = run_all;
        self
    }

    pub fn run_all(&self) -> bool {
        self.run_all
    }

    /// Check the header, then run rows until done or the first failure.
    pub fn run(&self, handler: &dyn RowHandler, data: &TestData) -> Result<TestSummary, RunError> {
        handler
            .parse_signature(&data.header)
            .map_err(|source| RunError::Signature {
                program: data.name.clone(),
                source,
            })?;

        info!(
            program = %data.name,
            signature = %handler.signature(),
            rows = data.len(),
            "running test data"
        );

        let mut summary = TestSummary::new(&data.name, data.len());
        for row in &data.rows {
            let verdict = handler.run_test(&row.tokens).map_err(|source| RunError::Row {
                program: data.name.clone(),
                line: row.line,
                source,
            })?;

            let result = RowResult::from_verdict(row, handler.argument_count(), verdict);
            let passed = result.passed;
            debug!(line = row.line, passed, "row finished");
            summary.record(result);

            if !passed && !self.run_all {
                warn!(program = %data.name, line = row.line, "stopping at first failing row");
                break;
            }
        }

        summary.finish();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict::{GenericTestHandler, TestFailure};

    fn add(a: i32, b: i32) -> i32 {
        a + b
    }

    fn require_positive(value: i64) {
        if value <= 0 {
            TestFailure::new("value must be positive")
                .with_property("value", value)
                .raise();
        }
    }

    fn data(content: &str) -> TestData {
        TestData::parse("add", "add.tsv", content).unwrap()
    }

    #[test]
    fn test_all_rows_pass() {
        let handler = GenericTestHandler::new(add);
        let summary = TestRunner::new()
            .run(&handler, &data("int\tint\tint\n1\t2\t3\n2\t2\t4\n"))
            .unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.passed, 2);
        assert!(summary.all_passed());
        assert_eq!(summary.timing.unwrap().samples, 2);
        assert_eq!(summary.results[1].arguments, vec!["2", "2"]);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let handler = GenericTestHandler::new(add);
        let summary = TestRunner::new()
            .run(&handler, &data("int\tint\tint\n1\t2\t4\n2\t2\t4\n3\t3\t7\n"))
            .unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 0);
        assert_eq!(summary.not_run(), 2);
        assert!(!summary.all_passed());
        assert!(summary.timing.is_none());

        let failure = summary.failures().next().unwrap();
        assert_eq!(failure.line, 2);
        assert_eq!(failure.expected.as_deref(), Some("4"));
        assert_eq!(failure.actual.as_deref(), Some("3"));
        assert!(failure.diff().is_some());
    }

    #[test]
    fn test_run_all_continues() {
        let handler = GenericTestHandler::new(add);
        let summary = TestRunner::new()
            .with_run_all(true)
            .run(&handler, &data("int\tint\tint\n1\t2\t4\n2\t2\t4\n3\t3\t7\n"))
            .unwrap();
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.not_run(), 0);
    }

    #[test]
    fn test_signature_error_aborts_before_rows() {
        let handler = GenericTestHandler::new(add);
        let err = TestRunner::new()
            .run(&handler, &data("int\tint\n1\t2\n"))
            .unwrap_err();
        assert!(matches!(err, RunError::Signature { .. }));
    }

    #[test]
    fn test_row_error_names_line() {
        let handler = GenericTestHandler::new(add);
        let err = TestRunner::new()
            .with_run_all(true)
            .run(&handler, &data("int\tint\tint\n1\t2\t3\n\n1\tx\t3\n"))
            .unwrap_err();
        match err {
            RunError::Row { line, source, .. } => {
                assert_eq!(line, 4);
                assert!(matches!(source, JudgeError::Deserialization { position: 1, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failure_signal_is_recorded() {
        let handler = GenericTestHandler::new(require_positive);
        let content = "long\tstring[explanation]\n5\t\n-1\tnegative input\n";
        let data = TestData::parse("positive", "positive.tsv", content).unwrap();
        let summary = TestRunner::new().with_run_all(true).run(&handler, &data).unwrap();

        assert_eq!(summary.passed, 1);
        let failure = summary.failures().next().unwrap();
        assert_eq!(failure.failure.as_deref(), Some("value must be positive; value: -1"));
        assert_eq!(failure.explanation.as_deref(), Some("negative input"));
        assert!(failure.diff().is_none());
    }

    #[test]
    fn test_row_result_json() {
        let row = RowResult {
            line: 2,
            arguments: vec!["1".to_string()],
            passed: true,
            elapsed: Duration::from_micros(40),
            expected: Some("1".to_string()),
            actual: Some("1".to_string()),
            failure: None,
            explanation: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["elapsed_us"], 40);
        assert!(json.get("failure").is_none());
    }
}
