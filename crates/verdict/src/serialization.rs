//! Serialization traits: textual token → typed value.
//!
//! Scalars are parsed from the raw token. Containers (`array`, `tuple`) are
//! JSON arrays; their elements go through [`Serialization::from_json`], so a
//! string nested in an array is a JSON string (`["a", "b"]`) while a top-level
//! `string` column is taken verbatim.

use serde_json::Value;
use thiserror::Error;

use crate::types::TypeDescriptor;

/// A token that does not have the literal shape of its target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ParseError {
    reason: String,
}

impl ParseError {
    /// Create a parse error with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason the token was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Prefix the reason with the container element that failed.
    fn at_element(self, index: usize) -> Self {
        Self::new(format!("element {index}: {}", self.reason))
    }
}

/// Per-type parse capability.
///
/// Implemented for every type that may appear as an argument or as the
/// expected value of a test. The [`descriptor`](Serialization::descriptor) is
/// what the signature matcher compares against header tokens.
pub trait Serialization: Sized {
    /// Semantic type of `Self`.
    fn descriptor() -> TypeDescriptor;

    /// Parse a top-level token.
    fn parse(token: &str) -> Result<Self, ParseError>;

    /// Convert a JSON value nested inside a container token.
    fn from_json(value: &Value) -> Result<Self, ParseError>;

    /// Canonical type name, as written in headers.
    fn type_name() -> String {
        Self::descriptor().to_string()
    }
}

fn parse_json(token: &str) -> Result<Value, ParseError> {
    serde_json::from_str(token).map_err(|e| ParseError::new(format!("invalid JSON: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn mismatch(expected: &str, value: &Value) -> ParseError {
    ParseError::new(format!("expected {expected}, found {}", json_kind(value)))
}

impl Serialization for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Void
    }

    fn parse(token: &str) -> Result<Self, ParseError> {
        if token.trim().is_empty() {
            Ok(())
        } else {
            Err(ParseError::new("void carries no value"))
        }
    }

    fn from_json(value: &Value) -> Result<Self, ParseError> {
        match value {
            Value::Null => Ok(()),
            other => Err(mismatch("null", other)),
        }
    }
}

impl Serialization for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Bool
    }

    fn parse(token: &str) -> Result<Self, ParseError> {
        match token {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ParseError::new("expected `true` or `false`")),
        }
    }

    fn from_json(value: &Value) -> Result<Self, ParseError> {
        value.as_bool().ok_or_else(|| mismatch("a boolean", value))
    }
}

macro_rules! integer_serialization {
    ($ty:ty, $descriptor:ident) => {
        impl Serialization for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::$descriptor
            }

            fn parse(token: &str) -> Result<Self, ParseError> {
                token
                    .parse::<$ty>()
                    .map_err(|e| ParseError::new(e.to_string()))
            }

            fn from_json(value: &Value) -> Result<Self, ParseError> {
                let wide = value.as_i64().ok_or_else(|| mismatch("an integer", value))?;
                <$ty>::try_from(wide)
                    .map_err(|_| ParseError::new(format!("{wide} is out of range")))
            }
        }
    };
}

integer_serialization!(i32, Int);
integer_serialization!(i64, Long);

impl Serialization for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Float
    }

    fn parse(token: &str) -> Result<Self, ParseError> {
        token
            .parse::<f64>()
            .map_err(|e| ParseError::new(e.to_string()))
    }

    fn from_json(value: &Value) -> Result<Self, ParseError> {
        value.as_f64().ok_or_else(|| mismatch("a number", value))
    }
}

impl Serialization for char {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Char
    }

    fn parse(token: &str) -> Result<Self, ParseError> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ParseError::new(format!(
                "expected exactly one character, found {}",
                token.chars().count()
            ))),
        }
    }

    fn from_json(value: &Value) -> Result<Self, ParseError> {
        let s = value.as_str().ok_or_else(|| mismatch("a string", value))?;
        Self::parse(s)
    }
}

impl Serialization for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn parse(token: &str) -> Result<Self, ParseError> {
        Ok(token.to_string())
    }

    fn from_json(value: &Value) -> Result<Self, ParseError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("a string", value))
    }
}

impl<T: Serialization> Serialization for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Array(Box::new(T::descriptor()))
    }

    fn parse(token: &str) -> Result<Self, ParseError> {
        Self::from_json(&parse_json(token)?)
    }

    fn from_json(value: &Value) -> Result<Self, ParseError> {
        value
            .as_array()
            .ok_or_else(|| mismatch("an array", value))?
            .iter()
            .enumerate()
            .map(|(i, item)| T::from_json(item).map_err(|e| e.at_element(i)))
            .collect()
    }
}

macro_rules! tuple_serialization {
    ($len:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: Serialization),+> Serialization for ($($name,)+) {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::Tuple(vec![$($name::descriptor()),+])
            }

            fn parse(token: &str) -> Result<Self, ParseError> {
                Self::from_json(&parse_json(token)?)
            }

            fn from_json(value: &Value) -> Result<Self, ParseError> {
                let items = value.as_array().ok_or_else(|| mismatch("an array", value))?;
                if items.len() != $len {
                    return Err(ParseError::new(format!(
                        "expected a tuple of {} element(s), found {}",
                        $len,
                        items.len()
                    )));
                }
                Ok(($($name::from_json(&items[$idx]).map_err(|e| e.at_element($idx))?,)+))
            }
        }
    };
}

tuple_serialization!(1; A: 0);
tuple_serialization!(2; A: 0, B: 1);
tuple_serialization!(3; A: 0, B: 1, C: 2);
tuple_serialization!(4; A: 0, B: 1, C: 2, D: 3);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_are_strict() {
        assert_eq!(i32::parse("42"), Ok(42));
        assert!(i32::parse(" 42").is_err());
        assert!(i32::parse("4.2").is_err());
        assert!(i32::parse("3000000000").is_err());
        assert_eq!(i64::parse("3000000000"), Ok(3_000_000_000));
        assert_eq!(bool::parse("true"), Ok(true));
        assert!(bool::parse("True").is_err());
        assert_eq!(char::parse("x"), Ok('x'));
        assert!(char::parse("xy").is_err());
        assert!(char::parse("").is_err());
    }

    #[test]
    fn test_string_token_is_verbatim() {
        assert_eq!(String::parse("hello world"), Ok("hello world".to_string()));
        assert_eq!(String::parse("[1, 2]"), Ok("[1, 2]".to_string()));
        assert_eq!(String::parse(""), Ok(String::new()));
    }

    #[test]
    fn test_float_accepts_integers_inside_arrays() {
        assert_eq!(Vec::<f64>::parse("[1, 2.5]"), Ok(vec![1.0, 2.5]));
        assert_eq!(f64::parse("-0.25"), Ok(-0.25));
    }

    #[test]
    fn test_nested_containers() {
        let parsed = Vec::<(i32, String)>::parse(r#"[[1, "a"], [2, "b"]]"#).unwrap();
        assert_eq!(parsed, vec![(1, "a".to_string()), (2, "b".to_string())]);

        let grid = Vec::<Vec<char>>::parse(r#"[["a", "b"], []]"#).unwrap();
        assert_eq!(grid, vec![vec!['a', 'b'], vec![]]);
    }

    #[test]
    fn test_container_errors_name_the_element() {
        let err = Vec::<i32>::parse("[1, \"two\", 3]").unwrap_err();
        assert!(err.reason().starts_with("element 1:"));

        let err = <(i32, i32)>::parse("[1, 2, 3]").unwrap_err();
        assert!(err.reason().contains("tuple of 2"));

        assert!(Vec::<i32>::parse("1, 2").is_err());
        assert!(Vec::<i32>::parse("{\"a\": 1}").is_err());
    }

    #[test]
    fn test_descriptors() {
        assert_eq!(<()>::descriptor(), TypeDescriptor::Void);
        assert_eq!(Vec::<Vec<i64>>::type_name(), "array(array(long))");
        assert_eq!(<(i32, char, bool)>::type_name(), "tuple(int,char,bool)");
    }

    #[test]
    fn test_void_takes_no_value() {
        assert_eq!(<()>::parse(""), Ok(()));
        assert!(<()>::parse("1").is_err());
    }
}
