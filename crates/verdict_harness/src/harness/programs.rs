//! Programs under test bundled with the harness.
//!
//! Each [`Program`] pairs a function with the name of its test-data file and
//! builds the handler that runs it. The bundled data lives in the crate's
//! `test_data/` directory.

use std::fmt;

use tracing::{debug, error, info, warn};
use verdict::{ApproxComparator, GenericTestHandler, RowHandler, TestFailure, comparator};

/// Tolerance for float results.
pub const FLOAT_TOLERANCE: f64 = 1e-6;

/// A registered function under test.
#[derive(Clone, Copy)]
pub struct Program {
    pub name: &'static str,
    pub description: &'static str,
    /// Test-data file stem, resolved as `<dir>/<data_file>.tsv`
    pub data_file: &'static str,
    build: fn() -> verdict::Result<Box<dyn RowHandler>>,
}

impl Program {
    /// Build a fresh handler for this program.
    pub fn handler(&self) -> verdict::Result<Box<dyn RowHandler>> {
        (self.build)()
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("data_file", &self.data_file)
            .finish_non_exhaustive()
    }
}

const PROGRAMS: &[Program] = &[
    Program {
        name: "add",
        description: "sum of two integers",
        data_file: "add",
        build: || Ok(Box::new(GenericTestHandler::new(add))),
    },
    Program {
        name: "gcd",
        description: "greatest common divisor",
        data_file: "gcd",
        build: || Ok(Box::new(GenericTestHandler::new(gcd))),
    },
    Program {
        name: "reverse_words",
        description: "reverse the order of space-separated words",
        data_file: "reverse_words",
        build: || Ok(Box::new(GenericTestHandler::new(reverse_words))),
    },
    Program {
        name: "log_message",
        description: "emit a log event at a named level",
        data_file: "log_message",
        build: || Ok(Box::new(GenericTestHandler::new(log_message))),
    },
    Program {
        name: "sorted_squares",
        description: "squares of a sorted array, in sorted order",
        data_file: "sorted_squares",
        build: || Ok(Box::new(GenericTestHandler::new(sorted_squares))),
    },
    Program {
        name: "square_root",
        description: "square root by Newton iteration",
        data_file: "square_root",
        build: || {
            let handler = GenericTestHandler::with_comparator(
                square_root,
                ApproxComparator::new(FLOAT_TOLERANCE),
            )?;
            Ok(Box::new(handler))
        },
    },
    Program {
        name: "anagram_groups",
        description: "group words that are anagrams, in any order",
        data_file: "anagram_groups",
        build: || {
            let handler =
                GenericTestHandler::with_comparator(anagram_groups, comparator(same_groups))?;
            Ok(Box::new(handler))
        },
    },
    Program {
        name: "check_sorted",
        description: "insertion sort that verifies its own output",
        data_file: "check_sorted",
        build: || Ok(Box::new(GenericTestHandler::new(check_sorted))),
    },
];

/// All registered programs, in listing order.
pub fn all() -> &'static [Program] {
    PROGRAMS
}

/// Look up a program by name.
pub fn find(name: &str) -> Option<&'static Program> {
    PROGRAMS.iter().find(|p| p.name == name)
}

pub fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    // Only 2^63, from i64::MIN against 0 or itself, is out of range.
    match i64::try_from(a) {
        Ok(divisor) => divisor,
        Err(_) => TestFailure::new("gcd does not fit in long")
            .with_property("gcd", a)
            .raise(),
    }
}

pub fn reverse_words(text: String) -> String {
    text.split(' ')
        .filter(|w| !w.is_empty())
        .rev()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn log_message(level: String, message: String) {
    match level.as_str() {
        "debug" => debug!(target: "verdict::program", "{message}"),
        "info" => info!(target: "verdict::program", "{message}"),
        "warn" => warn!(target: "verdict::program", "{message}"),
        "error" => error!(target: "verdict::program", "{message}"),
        other => TestFailure::new("unknown log level")
            .with_property("level", other)
            .raise(),
    }
}

pub fn sorted_squares(values: Vec<i32>) -> Vec<i32> {
    let mut squares: Vec<i32> = values.iter().map(|v| v.wrapping_mul(*v)).collect();
    squares.sort_unstable();
    squares
}

pub fn square_root(x: f64) -> f64 {
    if x < 0.0 || x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 || x.is_infinite() {
        return x;
    }
    let mut guess = if x > 1.0 { x / 2.0 } else { 1.0 };
    for _ in 0..100 {
        let next = 0.5 * (guess + x / guess);
        if (next - guess).abs() <= f64::EPSILON * next {
            return next;
        }
        guess = next;
    }
    guess
}

pub fn anagram_groups(words: Vec<String>) -> Vec<Vec<String>> {
    let mut groups: Vec<(Vec<char>, Vec<String>)> = Vec::new();
    for word in words {
        let mut key: Vec<char> = word.chars().collect();
        key.sort_unstable();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(word),
            None => groups.push((key, vec![word])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Groups compared as sets of sets.
#[allow(clippy::ptr_arg)]
fn same_groups(expected: &Vec<Vec<String>>, actual: &Vec<Vec<String>>) -> bool {
    fn normalize(groups: &[Vec<String>]) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = groups
            .iter()
            .map(|g| {
                let mut g = g.clone();
                g.sort();
                g
            })
            .collect();
        out.sort();
        out
    }
    normalize(expected) == normalize(actual)
}

pub fn check_sorted(values: Vec<i32>) {
    let mut sorted = values;
    for i in 1..sorted.len() {
        let mut j = i;
        while j > 0 && sorted[j - 1] > sorted[j] {
            sorted.swap(j - 1, j);
            j -= 1;
        }
    }
    if let Some(index) = sorted.windows(2).position(|w| w[0] > w[1]) {
        TestFailure::new("result is not sorted")
            .with_property("index", index)
            .raise();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{FixtureLoader, TestRunner};

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = all().iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("gcd").map(|p| p.data_file), Some("gcd"));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_every_handler_builds() {
        for program in all() {
            let handler = program.handler().unwrap();
            assert!(!handler.signature().is_empty(), "{}", program.name);
        }
    }

    #[test]
    fn test_bundled_data_passes() {
        let loader = FixtureLoader::bundled();
        for program in all() {
            let handler = program.handler().unwrap();
            let data = loader.load(program.data_file).unwrap();
            let summary = TestRunner::new().run(handler.as_ref(), &data).unwrap();
            assert!(summary.total > 0, "{} has no rows", program.name);
            assert!(
                summary.all_passed(),
                "{} failed: {:?}",
                program.name,
                summary.failures().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_gcd_signs() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(-12, 18), 6);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(0, 0), 0);
    }

    #[test]
    fn test_gcd_out_of_range_is_a_failure() {
        let handler = GenericTestHandler::new(gcd);
        let output = handler
            .run_test(&["-9223372036854775808", "0", "0"])
            .unwrap();
        assert!(!output.passed);
        assert_eq!(
            output.failure.unwrap().to_string(),
            "gcd does not fit in long; gcd: 9223372036854775808"
        );

        let output = handler
            .run_test(&["-9223372036854775808", "6", "2"])
            .unwrap();
        assert!(output.passed);
    }

    #[test]
    fn test_reverse_words_collapses_spaces() {
        assert_eq!(reverse_words("  hello   world ".to_string()), "world hello");
    }

    #[test]
    fn test_square_root_edges() {
        assert!((square_root(2.0) - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert!((square_root(0.25) - 0.5).abs() < 1e-12);
        assert!(square_root(-1.0).is_nan());
        assert_eq!(square_root(0.0), 0.0);
    }

    #[test]
    fn test_same_groups_ignores_order() {
        let expected = vec![
            vec!["tea".to_string(), "eat".to_string()],
            vec!["tan".to_string()],
        ];
        let actual = vec![
            vec!["tan".to_string()],
            vec!["eat".to_string(), "tea".to_string()],
        ];
        assert!(same_groups(&expected, &actual));
        assert!(!same_groups(&expected, &vec![vec!["tan".to_string()]]));
    }

    #[test]
    fn test_check_sorted_accepts_any_input() {
        check_sorted(vec![3, -1, 2, 2, 0]);
        check_sorted(Vec::new());
    }

    #[test]
    fn test_log_message_rejects_unknown_level() {
        let handler = GenericTestHandler::new(log_message);
        let output = handler.run_test(&["loud", "hello"]).unwrap();
        assert!(!output.passed);
        assert_eq!(
            output.failure.unwrap().to_string(),
            "unknown log level; level: loud"
        );
    }
}
