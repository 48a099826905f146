//! TestLogger - Run reporting
//!
//! Writes per-row results and run summaries either as human-readable text
//! (colored when the terminal supports it) or as JSON lines for CI:
//! - Optional timestamps (elapsed for human output, RFC 3339 for JSON)
//! - Passing rows only at `Debug` level
//! - Pluggable writer for tests
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use verdict_harness::harness::{LogLevel, RowResult, TestLogger};
//!
//! let mut logger = TestLogger::new()
//!     .with_level(LogLevel::Debug)
//!     .with_timestamps(false)
//!     .with_output(std::io::sink());
//!
//! logger.set_test_name("add");
//! logger.log_row(&RowResult {
//!     line: 2,
//!     arguments: vec!["2".into(), "3".into()],
//!     passed: true,
//!     elapsed: Duration::from_micros(4),
//!     expected: Some("5".into()),
//!     actual: Some("5".into()),
//!     failure: None,
//!     explanation: None,
//! });
//! ```

use std::io::{self, Write};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use verdict::format_duration;

use super::comparison::Diff;
use super::runner::{RowResult, TestSummary};

/// Minimum level of report output. Failing rows are `Error`, passing rows
/// are `Debug`, summaries are always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum LogLevel {
    Debug = 1,
    #[default]
    Info = 2,
    Error = 4,
}

impl LogLevel {
    /// Level shown for a `-v` count: 0 and 1 show results, 2+ adds passing
    /// rows.
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 | 1 => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Output format for the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format with indentation
    #[default]
    Human,
    /// JSON lines for CI parsing
    Json,
}

/// JSON record, one per line
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonRecord<'a> {
    Row {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        program: Option<&'a str>,
        #[serde(flatten)]
        result: &'a RowResult,
    },
    Summary {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        program: &'a str,
        total: usize,
        passed: usize,
        failed: usize,
        not_run: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        mean_us: Option<u128>,
        #[serde(skip_serializing_if = "Option::is_none")]
        median_us: Option<u128>,
    },
}

/// Output writer that can be colored or plain
enum OutputWriter {
    /// Standard stream with color support
    Colored(StandardStream),
    /// Plain writer (for testing)
    Plain(Box<dyn Write + Send>),
}

impl OutputWriter {
    fn write_colored(&mut self, spec: &ColorSpec, text: &str) -> io::Result<()> {
        match self {
            Self::Colored(stream) => {
                stream.set_color(spec)?;
                write!(stream, "{text}")?;
                stream.reset()
            }
            Self::Plain(writer) => write!(writer, "{text}"),
        }
    }

    fn write_plain(&mut self, text: &str) -> io::Result<()> {
        match self {
            Self::Colored(stream) => write!(stream, "{text}"),
            Self::Plain(writer) => write!(writer, "{text}"),
        }
    }

    fn newline(&mut self) -> io::Result<()> {
        match self {
            Self::Colored(stream) => writeln!(stream),
            Self::Plain(writer) => writeln!(writer),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Colored(stream) => stream.flush(),
            Self::Plain(writer) => writer.flush(),
        }
    }
}

/// Reporter for test runs
pub struct TestLogger {
    /// Minimum log level to output
    level: LogLevel,
    output: OutputWriter,
    format: OutputFormat,
    /// Current indentation level
    indent: usize,
    timestamps: bool,
    colors: bool,
    /// Current program name
    test_name: Option<String>,
    /// Start time for elapsed timestamps
    start_time: Instant,
}

impl Default for TestLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLogger {
    /// Create a new logger with default settings (stdout, Info level)
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            output: OutputWriter::Colored(StandardStream::stdout(ColorChoice::Auto)),
            format: OutputFormat::Human,
            indent: 0,
            timestamps: true,
            colors: true,
            test_name: None,
            start_time: Instant::now(),
        }
    }

    /// Set the minimum log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set whether to include timestamps
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Set whether to use colors
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        let choice = if colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        self.output = OutputWriter::Colored(StandardStream::stdout(choice));
        self
    }

    /// Set a custom output destination (disables colors)
    pub fn with_output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = OutputWriter::Plain(Box::new(output));
        self.colors = false;
        self
    }

    /// Set the current program name (appears in all log lines)
    pub fn set_test_name(&mut self, name: &str) {
        self.test_name = Some(name.to_string());
    }

    /// Clear the current program name
    pub fn clear_test_name(&mut self) {
        self.test_name = None;
    }

    fn timestamp_str(&self) -> Option<String> {
        if !self.timestamps {
            return None;
        }
        Some(match self.format {
            OutputFormat::Human => {
                let elapsed = self.start_time.elapsed();
                format!("{:>8.3}ms", elapsed.as_secs_f64() * 1000.0)
            }
            OutputFormat::Json => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    fn write_json(&mut self, record: &JsonRecord<'_>) {
        if let Ok(json) = serde_json::to_string(record) {
            let _ = self.output.write_plain(&json);
            let _ = self.output.newline();
            let _ = self.output.flush();
        }
    }

    fn write_colored_or_plain(&mut self, color: Color, bold: bool, text: &str) {
        if self.colors {
            let mut spec = ColorSpec::new();
            spec.set_fg(Some(color)).set_bold(bold);
            let _ = self.output.write_colored(&spec, text);
        } else {
            let _ = self.output.write_plain(text);
        }
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Report one row. Passing rows are debug output, failing rows are
    /// always shown with their details.
    pub fn log_row(&mut self, result: &RowResult) {
        let level = if result.passed {
            LogLevel::Debug
        } else {
            LogLevel::Error
        };
        if level < self.level {
            return;
        }

        if self.format == OutputFormat::Json {
            let timestamp = self.timestamp_str();
            let program = self.test_name.clone();
            self.write_json(&JsonRecord::Row {
                timestamp,
                program: program.as_deref(),
                result,
            });
            return;
        }

        let (status, color) = if result.passed {
            ("PASS", Color::Green)
        } else {
            ("FAIL", Color::Red)
        };
        if let Some(ts) = self.timestamp_str() {
            let _ = self.output.write_plain(&format!("[{ts}] "));
        }
        self.write_colored_or_plain(color, true, &format!("[{status}]"));
        let name = self.test_name.clone().unwrap_or_default();
        let _ = self.output.write_plain(&format!(
            " {name} line {} ({})",
            result.line,
            format_duration(result.elapsed)
        ));
        let _ = self.output.newline();

        if !result.passed {
            self.indent();
            self.write_detail("arguments", &result.arguments.join(" | "));
            if let Some(expected) = &result.expected {
                self.write_detail("expected", expected);
            }
            if let Some(actual) = &result.actual {
                self.write_detail("actual", actual);
            }
            if let Some(failure) = &result.failure {
                self.write_detail("failure", failure);
            }
            if let Some(explanation) = &result.explanation {
                self.write_detail("explanation", explanation);
            }
            if let Some(diff) = result.diff() {
                self.write_diff(&diff);
            }
            self.dedent();
        }
        let _ = self.output.flush();
    }

    fn write_detail(&mut self, key: &str, value: &str) {
        let indent = "  ".repeat(self.indent);
        let _ = self.output.write_plain(&format!("{indent}{key}: {value}"));
        let _ = self.output.newline();
    }

    fn write_diff(&mut self, diff: &Diff) {
        self.write_detail("diff", &diff.describe());
        if !diff.inline_diff.is_empty() {
            self.write_detail("inline", &diff.inline_diff);
        }
        self.write_detail("words", &diff.word_diff);
    }

    /// Report the outcome of one program's run
    pub fn log_summary(&mut self, summary: &TestSummary) {
        if self.format == OutputFormat::Json {
            let timestamp = self.timestamp_str();
            self.write_json(&JsonRecord::Summary {
                timestamp,
                program: &summary.program,
                total: summary.total,
                passed: summary.passed,
                failed: summary.failed,
                not_run: summary.not_run(),
                mean_us: summary.timing.map(|t| t.mean.as_micros()),
                median_us: summary.timing.map(|t| t.median.as_micros()),
            });
            return;
        }

        let (status, color) = if summary.all_passed() {
            ("PASS", Color::Green)
        } else {
            ("FAIL", Color::Red)
        };
        self.write_colored_or_plain(color, true, &format!("[{status}]"));
        let mut line = format!(
            " {}: {}/{} rows passed",
            summary.program, summary.passed, summary.total
        );
        if summary.failed > 0 {
            line.push_str(&format!(", {} failed", summary.failed));
        }
        if summary.not_run() > 0 {
            line.push_str(&format!(", {} not run", summary.not_run()));
        }
        let _ = self.output.write_plain(&line);
        let _ = self.output.newline();

        if let Some(timing) = summary.timing {
            self.indent();
            self.write_detail("timing", &timing.to_string_pretty());
            self.dedent();
        }
        let _ = self.output.flush();
    }
}
