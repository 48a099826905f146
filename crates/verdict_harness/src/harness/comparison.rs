//! Diff generation for failing rows
//!
//! Expected and actual values arrive as their single-line `Debug`
//! renderings. The diff points at the first differing character and marks
//! changed words inline.

use std::fmt::Write as _;

use similar::{ChangeTag, TextDiff};

/// Type of difference detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    /// Same length, some characters differ
    CharacterDiff,
    /// Values have different lengths
    LengthDiff,
}

/// Detailed diff between an expected and an actual rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub expected: String,
    pub actual: String,
    /// Character offset of the first difference
    pub first_diff_pos: Option<usize>,
    /// Human-readable description of the first difference
    pub inline_diff: String,
    /// Changed words marked as `[-old-]{+new+}`
    pub word_diff: String,
    pub diff_type: DiffType,
}

impl Diff {
    /// Diff two renderings, or `None` when they are identical.
    pub fn between(expected: &str, actual: &str) -> Option<Self> {
        if expected == actual {
            return None;
        }

        let diff_type = if expected.chars().count() != actual.chars().count() {
            DiffType::LengthDiff
        } else {
            DiffType::CharacterDiff
        };

        Some(Self {
            expected: expected.to_string(),
            actual: actual.to_string(),
            first_diff_pos: find_first_diff(expected, actual),
            inline_diff: generate_inline_diff(expected, actual),
            word_diff: generate_word_diff(expected, actual),
            diff_type,
        })
    }

    /// Get a human-readable description of the difference
    pub fn describe(&self) -> String {
        match self.diff_type {
            DiffType::CharacterDiff => match self.first_diff_pos {
                Some(pos) => format!("character difference at position {pos}"),
                None => "character difference".to_string(),
            },
            DiffType::LengthDiff => format!(
                "length difference: expected {} chars, got {}",
                self.expected.chars().count(),
                self.actual.chars().count()
            ),
        }
    }
}

fn find_first_diff(expected: &str, actual: &str) -> Option<usize> {
    expected
        .chars()
        .zip(actual.chars())
        .position(|(e, a)| e != a)
        .or_else(|| {
            let (e, a) = (expected.chars().count(), actual.chars().count());
            (e != a).then_some(e.min(a))
        })
}

fn generate_inline_diff(expected: &str, actual: &str) -> String {
    let Some(pos) = find_first_diff(expected, actual) else {
        return String::new();
    };

    match (expected.chars().nth(pos), actual.chars().nth(pos)) {
        (Some(e), Some(a)) => format!("at position {pos}: expected {e:?}, got {a:?}"),
        (Some(e), None) => format!("at position {pos}: expected {e:?}, but actual ended"),
        (None, Some(a)) => format!("at position {pos}: expected end, got {a:?}"),
        (None, None) => String::new(),
    }
}

fn generate_word_diff(expected: &str, actual: &str) -> String {
    let diff = TextDiff::from_words(expected, actual);
    let mut result = String::new();
    for change in diff.iter_all_changes() {
        let value = change.value();
        match change.tag() {
            ChangeTag::Equal => result.push_str(value),
            ChangeTag::Delete => {
                let _ = write!(result, "[-{value}-]");
            }
            ChangeTag::Insert => {
                let _ = write!(result, "{{+{value}+}}");
            }
        }
    }
    result
}
