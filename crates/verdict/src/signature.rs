//! Signature matcher: header tokens vs. compiled types.
//!
//! Catches test-data files written for a different function shape at load
//! time, before any row is deserialized.

use crate::error::{JudgeError, Result};
use crate::types::TypeDescriptor;

/// Check `header` against the compiled argument types and expected type.
///
/// A value-returning signature needs `args.len() + 1` columns. A void
/// signature needs `args.len()` columns, or `args.len() + 1` when the last
/// one is literally `void`.
pub fn match_signature<S: AsRef<str>>(
    header: &[S],
    args: &[TypeDescriptor],
    expected: &TypeDescriptor,
) -> Result<()> {
    let columns = if expected.is_void() {
        match header.len() {
            n if n == args.len() => args.len(),
            n if n == args.len() + 1 => args.len() + 1,
            found => {
                return Err(JudgeError::SignatureArity {
                    expected: args.len(),
                    found,
                });
            }
        }
    } else if header.len() == args.len() + 1 {
        args.len() + 1
    } else {
        return Err(JudgeError::SignatureArity {
            expected: args.len() + 1,
            found: header.len(),
        });
    };

    let compiled = args.iter().chain(std::iter::once(expected));
    for (position, (token, compiled)) in header.iter().zip(compiled).take(columns).enumerate() {
        let token = token.as_ref();
        let declared = TypeDescriptor::parse(token).map_err(|e| JudgeError::UnknownTypeName {
            position,
            token: token.to_string(),
            reason: e.to_string(),
        })?;

        if declared != *compiled {
            return Err(JudgeError::SignatureMismatch {
                position,
                declared: declared.to_string(),
                compiled: compiled.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use TypeDescriptor::{Bool, Int, String as Str, Void};

    #[test]
    fn test_value_signature_matches() {
        assert_eq!(match_signature(&["int", "int", "int"], &[Int, Int], &Int), Ok(()));
    }

    #[test]
    fn test_missing_expected_column() {
        assert_eq!(
            match_signature(&["int", "int"], &[Int, Int], &Int),
            Err(JudgeError::SignatureArity {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_void_signature_arity() {
        assert_eq!(match_signature(&["string"], &[Str], &Void), Ok(()));
        assert_eq!(match_signature(&["string", "void"], &[Str], &Void), Ok(()));
        assert!(matches!(
            match_signature(&["string", "int"], &[Str], &Void),
            Err(JudgeError::SignatureMismatch { position: 1, .. })
        ));
        assert!(matches!(
            match_signature::<&str>(&[], &[Str], &Void),
            Err(JudgeError::SignatureArity { expected: 1, found: 0 })
        ));
    }

    #[test]
    fn test_mismatch_reports_position() {
        let err = match_signature(&["int", "bool", "int"], &[Int, Int], &Int).unwrap_err();
        assert_eq!(
            err,
            JudgeError::SignatureMismatch {
                position: 1,
                declared: "bool".to_string(),
                compiled: "int".to_string(),
            }
        );
    }

    #[test]
    fn test_expected_slot_is_checked() {
        assert!(matches!(
            match_signature(&["int", "bool"], &[Int], &Int),
            Err(JudgeError::SignatureMismatch { position: 1, .. })
        ));
        assert_eq!(match_signature(&["int", "bool"], &[Int], &Bool), Ok(()));
    }

    #[test]
    fn test_unknown_type_token() {
        assert!(matches!(
            match_signature(&["integer", "int"], &[Int], &Int),
            Err(JudgeError::UnknownTypeName { position: 0, .. })
        ));
    }

    #[test]
    fn test_zero_argument_function() {
        assert_eq!(match_signature(&["long"], &[], &TypeDescriptor::Long), Ok(()));
        assert_eq!(match_signature::<&str>(&[], &[], &Void), Ok(()));
    }
}
