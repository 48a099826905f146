//! The generic test handler.
//!
//! A [`GenericTestHandler`] is bound to one function and one comparator. Its
//! argument types, return type and expected type are all fixed by those two
//! values' types, so the header of a test-data file can be checked against
//! them before any row runs.

use std::fmt;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace};

use crate::args::ArgumentBundle;
use crate::comparator::{Comparator, DefaultComparator};
use crate::error::{JudgeError, Result};
use crate::failure::{TestFailure, panic_message};
use crate::functional::{ReturnKind, TestFunction, invoke_with_timer};
use crate::output::{TestOutput, Verdict};
use crate::serialization::Serialization;
use crate::signature::match_signature;
use crate::timer::TestTimer;
use crate::types::TypeDescriptor;

/// How a single invocation ended, short of a fatal panic.
enum Invocation<R> {
    Returned(R),
    Failed(TestFailure),
}

/// Runs rows of test data against `func`.
///
/// ```rust
/// use verdict::GenericTestHandler;
///
/// fn add(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// let handler = GenericTestHandler::new(add);
/// handler.parse_signature(&["int", "int", "int"]).unwrap();
///
/// let output = handler.run_test(&["2", "3", "5"]).unwrap();
/// assert!(output.passed);
/// assert_eq!(output.actual, Some(5));
/// ```
pub struct GenericTestHandler<F, Args, C = DefaultComparator> {
    func: F,
    comparator: C,
    return_kind: ReturnKind,
    _args: PhantomData<fn() -> Args>,
}

impl<F, Args> GenericTestHandler<F, Args, DefaultComparator>
where
    F: TestFunction<Args>,
    Args: ArgumentBundle,
    F::Output: Serialization + PartialEq + 'static,
{
    /// Handler comparing results by equality. The expected type is the
    /// return type, so construction cannot fail.
    pub fn new(func: F) -> Self {
        Self {
            func,
            comparator: DefaultComparator,
            return_kind: ReturnKind::of::<F::Output>(),
            _args: PhantomData,
        }
    }
}

impl<F, Args, C> GenericTestHandler<F, Args, C>
where
    F: TestFunction<Args>,
    Args: ArgumentBundle,
    C: Comparator<F::Output>,
    F::Output: 'static,
    C::Expected: 'static,
{
    /// Handler using a custom comparator; the comparator's expected type
    /// decides how the trailing column is parsed.
    ///
    /// Fails with [`JudgeError::Configuration`] when exactly one of the
    /// return type and the expected type is `()`.
    pub fn with_comparator(func: F, comparator: C) -> Result<Self> {
        let return_kind = ReturnKind::of::<F::Output>();
        let expected_kind = ReturnKind::of::<C::Expected>();
        if return_kind != expected_kind {
            return Err(JudgeError::Configuration(format!(
                "comparator expects `{}` but the function returns `{}`; \
                 expected type must be void exactly when the return type is void",
                <C::Expected as Serialization>::type_name(),
                std::any::type_name::<F::Output>(),
            )));
        }
        Ok(Self {
            func,
            comparator,
            return_kind,
            _args: PhantomData,
        })
    }

    pub fn return_kind(&self) -> ReturnKind {
        self.return_kind
    }

    pub fn argument_count(&self) -> usize {
        Args::ARITY
    }

    /// Compiled argument types, in order.
    pub fn argument_types(&self) -> Vec<TypeDescriptor> {
        Args::descriptors()
    }

    /// Type the expected column is parsed as.
    pub fn expected_type(&self) -> TypeDescriptor {
        <C::Expected as Serialization>::descriptor()
    }

    /// Human-readable signature, e.g. `(int, int) -> int`.
    pub fn signature(&self) -> String {
        let args: Vec<String> = self.argument_types().iter().map(ToString::to_string).collect();
        format!("({}) -> {}", args.join(", "), self.expected_type())
    }

    /// Tokens per data row.
    fn row_arity(&self) -> usize {
        match self.return_kind {
            ReturnKind::Void => Args::ARITY,
            ReturnKind::Value => Args::ARITY + 1,
        }
    }

    /// Check a header against this handler's compiled signature.
    pub fn parse_signature<S: AsRef<str>>(&self, header: &[S]) -> Result<()> {
        match_signature(header, &self.argument_types(), &self.expected_type())?;
        debug!(signature = %self.signature(), "signature matched");
        Ok(())
    }

    /// Parse one row, invoke the function and build its verdict.
    ///
    /// A comparator mismatch or a raised [`TestFailure`] is a failed row,
    /// not an error. Malformed rows and unexpected panics are fatal.
    pub fn run_test<S: AsRef<str>>(&self, row: &[S]) -> Result<TestOutput<C::Expected, F::Output>> {
        let mut tokens: Vec<&str> = row.iter().map(AsRef::as_ref).collect();
        // Empty cell under a trailing `void` header column.
        if self.return_kind.is_void()
            && tokens.len() == Args::ARITY + 1
            && tokens.last().is_some_and(|t| t.trim().is_empty())
        {
            tokens.pop();
        }
        if tokens.len() != self.row_arity() {
            return Err(JudgeError::RowArity {
                expected: self.row_arity(),
                found: tokens.len(),
            });
        }

        let (arg_tokens, expected_token) = match (self.return_kind, tokens.split_last()) {
            (ReturnKind::Value, Some((last, rest))) => (rest, Some(*last)),
            _ => (tokens.as_slice(), None),
        };

        let args = Args::parse_tokens(arg_tokens)?;
        trace!(?arg_tokens, "parsed arguments");

        let mut timer = TestTimer::new();
        let output = match expected_token {
            None => match self.invoke(&mut timer, args)? {
                Invocation::Returned(_) => TestOutput::void(timer),
                Invocation::Failed(failure) => TestOutput::failed(timer, None, failure),
            },
            Some(token) => {
                let expected = <C::Expected as Serialization>::parse(token).map_err(|e| {
                    JudgeError::ExpectedDeserialization {
                        token: token.to_string(),
                        type_name: <C::Expected as Serialization>::type_name(),
                        reason: e.reason().to_string(),
                    }
                })?;
                match self.invoke(&mut timer, args)? {
                    Invocation::Returned(actual) => {
                        let passed = self.comparator.compare(&expected, &actual);
                        TestOutput::compared(passed, timer, expected, actual)
                    }
                    Invocation::Failed(failure) => {
                        TestOutput::failed(timer, Some(expected), failure)
                    }
                }
            }
        };

        debug!(
            passed = output.passed,
            elapsed_us = output.elapsed().as_micros(),
            "row verdict"
        );
        Ok(output)
    }

    fn invoke(&self, timer: &mut TestTimer, args: Args) -> Result<Invocation<F::Output>> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            invoke_with_timer(&self.func, timer, args)
        }));

        match outcome {
            Ok(value) => Ok(Invocation::Returned(value)),
            Err(payload) => {
                timer.stop();
                match payload.downcast::<TestFailure>() {
                    Ok(failure) => {
                        debug!(failure = %failure, "test failure signal caught");
                        Ok(Invocation::Failed(*failure))
                    }
                    Err(payload) => Err(JudgeError::InvocationPanicked {
                        message: panic_message(payload.as_ref()),
                    }),
                }
            }
        }
    }
}

impl<F, Args, C: Debug> Debug for GenericTestHandler<F, Args, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericTestHandler")
            .field("function", &std::any::type_name::<F>())
            .field("comparator", &self.comparator)
            .field("return_kind", &self.return_kind)
            .finish()
    }
}

/// Object-safe view of a handler, for drivers that hold many programs.
pub trait RowHandler {
    fn parse_signature(&self, header: &[String]) -> Result<()>;

    fn run_test(&self, row: &[String]) -> Result<Verdict>;

    fn argument_count(&self) -> usize;

    fn return_kind(&self) -> ReturnKind;

    fn signature(&self) -> String;
}

impl<F, Args, C> RowHandler for GenericTestHandler<F, Args, C>
where
    F: TestFunction<Args>,
    Args: ArgumentBundle,
    C: Comparator<F::Output>,
    F::Output: Debug + 'static,
    C::Expected: Debug + 'static,
{
    fn parse_signature(&self, header: &[String]) -> Result<()> {
        GenericTestHandler::parse_signature(self, header)
    }

    fn run_test(&self, row: &[String]) -> Result<Verdict> {
        GenericTestHandler::run_test(self, row).map(TestOutput::into_verdict)
    }

    fn argument_count(&self) -> usize {
        Args::ARITY
    }

    fn return_kind(&self) -> ReturnKind {
        self.return_kind
    }

    fn signature(&self) -> String {
        GenericTestHandler::signature(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::comparator;

    fn add(a: i32, b: i32) -> i32 {
        a + b
    }

    fn log_message(_message: String) {}

    fn first_negative(values: Vec<i32>) -> i32 {
        match values.iter().position(|v| *v < 0) {
            Some(index) => values[index],
            None => TestFailure::new("no negative value")
                .with_property("len", values.len())
                .raise(),
        }
    }

    #[test]
    fn test_value_row_passes() {
        let handler = GenericTestHandler::new(add);
        let out = handler.run_test(&["2", "3", "5"]).unwrap();
        assert!(out.passed);
        assert_eq!(out.expected, Some(5));
        assert_eq!(out.actual, Some(5));
    }

    #[test]
    fn test_value_row_fails_without_error() {
        let handler = GenericTestHandler::new(add);
        let out = handler.run_test(&["2", "3", "6"]).unwrap();
        assert!(!out.passed);
        assert_eq!(out.expected, Some(6));
        assert_eq!(out.actual, Some(5));
        assert!(out.failure.is_none());
    }

    #[test]
    fn test_void_row() {
        let handler = GenericTestHandler::new(log_message);
        assert_eq!(handler.return_kind(), ReturnKind::Void);
        let out = handler.run_test(&["hello"]).unwrap();
        assert!(out.passed);
        assert!(out.expected.is_none());
        assert!(out.actual.is_none());
    }

    #[test]
    fn test_row_arity_checked_before_parsing() {
        let handler = GenericTestHandler::new(add);
        assert_eq!(
            handler.run_test(&["2", "3"]).unwrap_err(),
            JudgeError::RowArity {
                expected: 3,
                found: 2
            }
        );
        let void = GenericTestHandler::new(log_message);
        assert!(matches!(
            void.run_test(&["hello", "extra"]),
            Err(JudgeError::RowArity { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_void_row_with_empty_trailing_cell() {
        let handler = GenericTestHandler::new(log_message);
        handler.parse_signature(&["string", "void"]).unwrap();
        assert!(handler.run_test(&["hello", ""]).unwrap().passed);
        assert!(handler.run_test(&["", ""]).unwrap().passed);
    }

    #[test]
    fn test_bad_expected_token_is_fatal() {
        let handler = GenericTestHandler::new(add);
        assert!(matches!(
            handler.run_test(&["1", "2", "three"]),
            Err(JudgeError::ExpectedDeserialization { .. })
        ));
    }

    #[test]
    fn test_failure_signal_marks_row_failed() {
        let handler = GenericTestHandler::new(first_negative);
        let out = handler.run_test(&["[1, 2]", "-1"]).unwrap();
        assert!(!out.passed);
        assert_eq!(out.expected, Some(-1));
        assert!(out.actual.is_none());
        assert!(!out.timer.is_running());
        let failure = out.failure.unwrap();
        assert_eq!(failure.message(), "no negative value");
        assert_eq!(failure.properties(), &[("len".to_string(), "2".to_string())]);

        let out = handler.run_test(&["[1, -4]", "-4"]).unwrap();
        assert!(out.passed);
    }

    #[test]
    fn test_other_panics_are_fatal() {
        let handler = GenericTestHandler::new(|divisor: i32| 10 / divisor);
        let err = handler.run_test(&["0", "0"]).unwrap_err();
        assert!(matches!(err, JudgeError::InvocationPanicked { .. }));
    }

    #[test]
    fn test_custom_comparator_changes_expected_type() {
        let by_len = comparator(|expected: &i64, actual: &String| actual.len() as i64 == *expected);
        let handler =
            GenericTestHandler::with_comparator(|s: String| s.to_uppercase(), by_len).unwrap();
        assert_eq!(handler.expected_type(), TypeDescriptor::Long);
        handler.parse_signature(&["string", "long"]).unwrap();
        assert!(handler.parse_signature(&["string", "string"]).is_err());

        let out = handler.run_test(&["abc", "3"]).unwrap();
        assert!(out.passed);
        assert_eq!(out.expected, Some(3));
        assert_eq!(out.actual.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_void_mismatch_is_configuration_error() {
        let always = comparator(|_: &i32, _: &()| true);
        let err = GenericTestHandler::with_comparator(log_message, always).unwrap_err();
        assert!(matches!(err, JudgeError::Configuration(_)));

        let unit = comparator(|_: &(), _: &i32| true);
        assert!(GenericTestHandler::with_comparator(add, unit).is_err());
    }

    #[test]
    fn test_signature_rendering() {
        assert_eq!(GenericTestHandler::new(add).signature(), "(int, int) -> int");
        assert_eq!(GenericTestHandler::new(log_message).signature(), "(string) -> void");
    }

    #[test]
    fn test_row_handler_erases_types() {
        let handlers: Vec<Box<dyn RowHandler>> = vec![
            Box::new(GenericTestHandler::new(add)),
            Box::new(GenericTestHandler::new(log_message)),
        ];
        let header = vec!["int".to_string(), "int".to_string(), "int".to_string()];
        handlers[0].parse_signature(&header).unwrap();
        let verdict = handlers[0]
            .run_test(&["1".to_string(), "1".to_string(), "2".to_string()])
            .unwrap();
        assert!(verdict.passed);
        assert_eq!(verdict.actual.as_deref(), Some("2"));

        assert_eq!(handlers[1].argument_count(), 1);
        assert_eq!(handlers[1].return_kind(), ReturnKind::Void);
    }
}
