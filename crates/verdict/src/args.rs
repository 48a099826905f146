//! Argument parser: row tokens → positionally typed argument tuple.

use tracing::trace;

use crate::error::{JudgeError, Result};
use crate::serialization::Serialization;
use crate::types::TypeDescriptor;

/// A fixed-arity tuple of deserializable arguments.
///
/// Implemented for tuples of 0 through 6 [`Serialization`] types. Parsing is
/// all-or-nothing: either every token parses and the tuple is returned, or
/// the first failing position is reported and nothing is built.
pub trait ArgumentBundle: Sized {
    /// Number of arguments.
    const ARITY: usize;

    /// Semantic types of the arguments, in order.
    fn descriptors() -> Vec<TypeDescriptor>;

    /// Parse exactly [`ARITY`](ArgumentBundle::ARITY) tokens.
    fn parse_tokens(tokens: &[&str]) -> Result<Self>;
}

fn parse_at<T: Serialization>(position: usize, token: &str) -> Result<T> {
    T::parse(token).map_err(|e| JudgeError::Deserialization {
        position,
        token: token.to_string(),
        type_name: T::type_name(),
        reason: e.reason().to_string(),
    })
}

macro_rules! argument_bundle {
    ($len:expr; $($ty:ident : $idx:tt),*) => {
        impl<$($ty: Serialization),*> ArgumentBundle for ($($ty,)*) {
            const ARITY: usize = $len;

            fn descriptors() -> Vec<TypeDescriptor> {
                vec![$($ty::descriptor()),*]
            }

            fn parse_tokens(tokens: &[&str]) -> Result<Self> {
                if tokens.len() != Self::ARITY {
                    return Err(JudgeError::RowArity {
                        expected: Self::ARITY,
                        found: tokens.len(),
                    });
                }
                trace!(arity = Self::ARITY, ?tokens, "parsing argument bundle");
                Ok(($(parse_at::<$ty>($idx, tokens[$idx])?,)*))
            }
        }
    };
}

argument_bundle!(0;);
argument_bundle!(1; A: 0);
argument_bundle!(2; A: 0, B: 1);
argument_bundle!(3; A: 0, B: 1, C: 2);
argument_bundle!(4; A: 0, B: 1, C: 2, D: 3);
argument_bundle!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
argument_bundle!(6; A: 0, B: 1, C: 2, D: 3, E: 4, G: 5);
