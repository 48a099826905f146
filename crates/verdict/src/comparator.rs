//! Comparison policies between a parsed expected value and the actual result.
//!
//! A comparator decides two things: whether a row passed, and which type the
//! expected column is parsed as ([`Comparator::Expected`]). With
//! [`DefaultComparator`] that is the function's return type. A custom
//! comparator may accept a different representation, e.g. a sorted list for a
//! function that returns items in arbitrary order.

use std::marker::PhantomData;

use crate::serialization::Serialization;

/// Binary predicate over `(expected, actual)`.
pub trait Comparator<R> {
    /// Type the expected column is deserialized into.
    type Expected: Serialization;

    /// Returns true when `actual` is acceptable for `expected`.
    fn compare(&self, expected: &Self::Expected, actual: &R) -> bool;
}

/// Value equality; the expected type is the return type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComparator;

impl<R> Comparator<R> for DefaultComparator
where
    R: Serialization + PartialEq,
{
    type Expected = R;

    fn compare(&self, expected: &R, actual: &R) -> bool {
        expected == actual
    }
}

/// A closure comparator; its first parameter type becomes the expected type.
///
/// Built with [`comparator`] so the closure's parameter types drive inference.
pub struct FnComparator<E, F> {
    predicate: F,
    _expected: PhantomData<fn(&E)>,
}

impl<E, F: Clone> Clone for FnComparator<E, F> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            _expected: PhantomData,
        }
    }
}

impl<E, F> std::fmt::Debug for FnComparator<E, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnComparator")
            .field("expected", &std::any::type_name::<E>())
            .finish_non_exhaustive()
    }
}

impl<E, R, F> Comparator<R> for FnComparator<E, F>
where
    E: Serialization,
    F: Fn(&E, &R) -> bool,
{
    type Expected = E;

    fn compare(&self, expected: &E, actual: &R) -> bool {
        (self.predicate)(expected, actual)
    }
}

/// Wrap a predicate `(expected, actual) -> bool` as a [`Comparator`].
///
/// ```rust
/// use verdict::comparator::{comparator, Comparator};
///
/// // Expected column holds the sum; the function returns the parts.
/// let sums = comparator(|expected: &i64, actual: &Vec<i64>| {
///     actual.iter().sum::<i64>() == *expected
/// });
/// assert!(sums.compare(&6, &vec![1, 2, 3]));
/// ```
pub fn comparator<E, R, F>(predicate: F) -> FnComparator<E, F>
where
    E: Serialization,
    F: Fn(&E, &R) -> bool,
{
    FnComparator {
        predicate,
        _expected: PhantomData,
    }
}

/// Float comparison within an absolute tolerance.
///
/// `NaN` equals `NaN`, and infinities are equal when their signs match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxComparator {
    epsilon: f64,
}

impl ApproxComparator {
    /// Create a comparator accepting `|expected - actual| <= epsilon`.
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.abs(),
        }
    }

    /// The configured tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for ApproxComparator {
    fn default() -> Self {
        Self::new(1e-9)
    }
}

impl Comparator<f64> for ApproxComparator {
    type Expected = f64;

    fn compare(&self, expected: &f64, actual: &f64) -> bool {
        let (expected, actual) = (*expected, *actual);
        if expected.is_nan() || actual.is_nan() {
            return expected.is_nan() && actual.is_nan();
        }
        if expected.is_infinite() || actual.is_infinite() {
            return expected == actual;
        }
        (expected - actual).abs() <= self.epsilon
    }
}
