//! Fatal error taxonomy.
//!
//! Every [`JudgeError`] means the harness configuration or the test data is
//! broken, so no further rows can be trusted. Per-row failures (a comparator
//! returning `false`, or a raised [`TestFailure`]) are not errors; they are
//! recorded in the row's [`TestOutput`].
//!
//! [`TestFailure`]: crate::failure::TestFailure
//! [`TestOutput`]: crate::output::TestOutput

use thiserror::Error;

/// Fatal errors raised by signature matching, row parsing or invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JudgeError {
    /// The header has the wrong number of columns for the function.
    #[error("signature arity mismatch: header has {found} column(s), function expects {expected}")]
    SignatureArity { expected: usize, found: usize },

    /// A header column is not a recognized type name.
    #[error("header column {position}: unrecognized type name `{token}`: {reason}")]
    UnknownTypeName {
        position: usize,
        token: String,
        reason: String,
    },

    /// A header column names a different type than the compiled signature.
    #[error(
        "signature type mismatch in header column {position}: declared `{declared}`, function expects `{compiled}`"
    )]
    SignatureMismatch {
        position: usize,
        declared: String,
        compiled: String,
    },

    /// A data row has the wrong number of tokens.
    #[error("row arity mismatch: row has {found} token(s), expected {expected}")]
    RowArity { expected: usize, found: usize },

    /// An argument token could not be parsed as its declared type.
    #[error("cannot parse argument {position} `{token}` as {type_name}: {reason}")]
    Deserialization {
        position: usize,
        token: String,
        type_name: String,
        reason: String,
    },

    /// The trailing expected-value token could not be parsed.
    #[error("cannot parse expected value `{token}` as {type_name}: {reason}")]
    ExpectedDeserialization {
        token: String,
        type_name: String,
        reason: String,
    },

    /// The handler was constructed with an inconsistent function/comparator pair.
    #[error("invalid handler configuration: {0}")]
    Configuration(String),

    /// The function under test panicked with something other than a test failure.
    #[error("function under test panicked: {message}")]
    InvocationPanicked { message: String },
}

impl JudgeError {
    /// Returns true for errors detected while matching the header.
    pub fn is_signature_error(&self) -> bool {
        matches!(
            self,
            Self::SignatureArity { .. }
                | Self::UnknownTypeName { .. }
                | Self::SignatureMismatch { .. }
        )
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, JudgeError>;
