//! FixtureLoader - Test-data loading
//!
//! Test data lives in tab-separated `.tsv` files, one per program:
//!
//! ```text
//! int	int	int
//! 2	3	5
//! 10	-4	6
//! ```
//!
//! The first non-blank line is the header (type names), every following
//! line is a row of value tokens. Empty lines are skipped when the header has
//! two or more columns; with a single column an empty line is a row holding
//! one empty token. A line containing a tab is always a row. A trailing
//! header column named `string[explanation]` marks free-text notes that are
//! split off each row and kept for diagnostics.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Header token of the optional explanation column.
pub const EXPLANATION_COLUMN: &str = "string[explanation]";

/// File extension of test-data files.
pub const TEST_DATA_EXTENSION: &str = "tsv";

/// Errors that can occur when loading test data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// Test-data file not found
    #[error("test data not found: {path}")]
    NotFound { path: String },

    /// IO error reading the file
    #[error("io error reading {path}: {error}")]
    Io { path: String, error: String },

    /// File has no header line
    #[error("test data {path} is empty: missing header line")]
    Empty { path: String },

    /// Row column count differs from the header
    #[error("{path}:{line}: row has {found} column(s), header has {expected}")]
    RaggedRow {
        path: String,
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type for loading operations
pub type FixtureResult<T> = Result<T, FixtureError>;

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRow {
    /// 1-based line number in the source file
    pub line: usize,
    /// Value tokens, explanation column removed
    pub tokens: Vec<String>,
    /// Free-text explanation, if the file has that column and it is non-empty
    pub explanation: Option<String>,
}

/// A parsed test-data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestData {
    pub name: String,
    pub path: PathBuf,
    /// Type-name tokens, explanation column removed
    pub header: Vec<String>,
    pub rows: Vec<TestRow>,
}

impl TestData {
    /// Parse tab-separated content. `path` is only used in error messages.
    pub fn parse(name: &str, path: impl Into<PathBuf>, content: &str) -> FixtureResult<Self> {
        let path = path.into();
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line))
            .skip_while(|(_, line)| line.trim().is_empty());

        let Some((_, header_line)) = lines.next() else {
            return Err(FixtureError::Empty {
                path: path.display().to_string(),
            });
        };

        let mut header: Vec<String> = header_line.split('\t').map(str::to_string).collect();
        let columns = header.len();
        let has_explanation = header.last().is_some_and(|h| h == EXPLANATION_COLUMN);
        if has_explanation {
            header.pop();
        }

        let mut rows = Vec::new();
        for (line, text) in lines {
            if text.is_empty() && columns > 1 {
                continue;
            }
            let mut tokens: Vec<String> = text.split('\t').map(str::to_string).collect();
            if tokens.len() != columns {
                return Err(FixtureError::RaggedRow {
                    path: path.display().to_string(),
                    line,
                    expected: columns,
                    found: tokens.len(),
                });
            }
            let explanation = if has_explanation {
                tokens.pop().filter(|e| !e.trim().is_empty())
            } else {
                None
            };
            rows.push(TestRow {
                line,
                tokens,
                explanation,
            });
        }

        Ok(Self {
            name: name.to_string(),
            path,
            header,
            rows,
        })
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Loader for the test-data files of one directory
///
/// # Example
///
/// ```rust,no_run
/// use verdict_harness::harness::FixtureLoader;
///
/// let loader = FixtureLoader::with_base_path("test_data");
/// let data = loader.load("add").unwrap();
/// println!("{} rows for {:?}", data.len(), data.header);
/// ```
#[derive(Debug, Clone)]
pub struct FixtureLoader {
    /// Directory holding `<name>.tsv` files
    base_path: PathBuf,
}

impl FixtureLoader {
    /// Loader over the test data shipped with this crate
    pub fn bundled() -> Self {
        Self::with_base_path(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data"))
    }

    /// Loader over a custom directory
    pub fn with_base_path(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the file for `name`
    pub fn data_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{name}.{TEST_DATA_EXTENSION}"))
    }

    /// Check if a test-data file exists
    pub fn exists(&self, name: &str) -> bool {
        self.data_path(name).is_file()
    }

    /// Read and parse the file for `name`
    pub fn load(&self, name: &str) -> FixtureResult<TestData> {
        let path = self.data_path(name);
        let path_str = path.display().to_string();

        if !path.is_file() {
            return Err(FixtureError::NotFound { path: path_str });
        }

        let content = fs::read_to_string(&path).map_err(|e| FixtureError::Io {
            path: path_str,
            error: e.to_string(),
        })?;

        let data = TestData::parse(name, path, &content)?;
        debug!(name, rows = data.len(), "loaded test data");
        Ok(data)
    }

    /// Names of all test-data files in the directory, sorted
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.base_path) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == TEST_DATA_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(format!("{name}.tsv")), content).unwrap();
    }

    #[test]
    fn test_parse_header_and_rows() {
        let data = TestData::parse("add", "add.tsv", "int\tint\tint\n2\t3\t5\n\n10\t-4\t6\n").unwrap();
        assert_eq!(data.header, vec!["int", "int", "int"]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows[0].tokens, vec!["2", "3", "5"]);
        assert_eq!(data.rows[0].line, 2);
        assert_eq!(data.rows[1].line, 4);
        assert!(data.rows[1].explanation.is_none());
    }

    #[test]
    fn test_crlf_line_endings() {
        let data = TestData::parse("x", "x.tsv", "string\r\nhello world\r\n").unwrap();
        assert_eq!(data.rows[0].tokens, vec!["hello world"]);
    }

    #[test]
    fn test_tab_only_row_is_kept() {
        let data = TestData::parse("rw", "rw.tsv", "string\tstring\nab\tab\n\t\n").unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.rows[1].tokens, vec!["", ""]);
        assert_eq!(data.rows[1].line, 3);
    }

    #[test]
    fn test_empty_line_is_a_row_for_single_column() {
        let data = TestData::parse("log", "log.tsv", "string\nhello\n\nworld\n").unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.rows[1].tokens, vec![""]);

        let data = TestData::parse("tick", "tick.tsv", "void\n\n\n").unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_whitespace_line_is_ragged_for_multi_column() {
        let err = TestData::parse("add", "add.tsv", "int\tint\tint\n  \n").unwrap_err();
        assert!(matches!(err, FixtureError::RaggedRow { line: 2, found: 1, .. }));
    }

    #[test]
    fn test_explanation_column_is_split_off() {
        let content = "int\tint\tstring[explanation]\n1\t1\tidentity\n2\t2\t\n";
        let data = TestData::parse("id", "id.tsv", content).unwrap();
        assert_eq!(data.header, vec!["int", "int"]);
        assert_eq!(data.rows[0].tokens, vec!["1", "1"]);
        assert_eq!(data.rows[0].explanation.as_deref(), Some("identity"));
        assert!(data.rows[1].explanation.is_none());
    }

    #[test]
    fn test_ragged_row() {
        let err = TestData::parse("add", "add.tsv", "int\tint\tint\n1\t2\n").unwrap_err();
        assert_eq!(
            err,
            FixtureError::RaggedRow {
                path: "add.tsv".to_string(),
                line: 2,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            TestData::parse("e", "e.tsv", "\n  \n"),
            Err(FixtureError::Empty { .. })
        ));
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let data = TestData::parse("h", "h.tsv", "int\tint\n").unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_loader_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        write(&dir, "add", "int\tint\tint\n1\t2\t3\n");

        let loader = FixtureLoader::with_base_path(dir.path());
        assert!(loader.exists("add"));
        assert!(!loader.exists("gcd"));
        let data = loader.load("add").unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.path, dir.path().join("add.tsv"));

        write(&dir, "add", "int\tint\tint\n1\t2\t3\n4\t5\t9\n");
        assert_eq!(loader.load("add").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let loader = FixtureLoader::with_base_path(dir.path());
        assert!(matches!(loader.load("nope"), Err(FixtureError::NotFound { .. })));
    }

    #[test]
    fn test_list_only_tsv_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b", "int\n");
        write(&dir, "a", "int\n");
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loader = FixtureLoader::with_base_path(dir.path());
        assert_eq!(loader.list(), vec!["a", "b"]);
    }

    #[test]
    fn test_bundled_path() {
        let loader = FixtureLoader::bundled();
        assert!(loader.base_path().ends_with("test_data"));
        assert!(loader.data_path("add").ends_with("test_data/add.tsv"));
    }
}
