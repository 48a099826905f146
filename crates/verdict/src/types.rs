//! Semantic type vocabulary shared by test-data headers and compiled signatures.
//!
//! A [`TypeDescriptor`] is the identity the signature matcher compares: header
//! tokens are parsed into descriptors, and every [`Serialization`] impl
//! reports the descriptor of the Rust type it deserializes.
//!
//! Canonical spellings:
//!
//! | token               | Rust type            |
//! |---------------------|----------------------|
//! | `void`              | `()`                 |
//! | `bool`              | `bool`               |
//! | `int`               | `i32`                |
//! | `long`              | `i64`                |
//! | `float` / `double`  | `f64`                |
//! | `char`              | `char`               |
//! | `string`            | `String`             |
//! | `array(T)`          | `Vec<T>`             |
//! | `tuple(T1,...,Tn)`  | `(T1, ..., Tn)`      |
//!
//! [`Serialization`]: crate::serialization::Serialization

use std::fmt;

use thiserror::Error;

/// Errors produced while parsing a header type token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeNameError {
    /// The token was empty or whitespace.
    #[error("empty type name")]
    Empty,

    /// The base name is not part of the vocabulary.
    #[error("unknown type `{0}`")]
    Unknown(String),

    /// Parentheses are unbalanced or trailing text follows them.
    #[error("malformed type expression `{0}`")]
    Malformed(String),

    /// A container received the wrong number of parameters.
    #[error("`{name}` takes {expected} type parameter(s), found {found}")]
    ParameterCount {
        name: String,
        expected: &'static str,
        found: usize,
    },
}

/// Semantic type of a header column or a compiled argument/return slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// No value; only valid in the expected/return slot.
    Void,
    Bool,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 64-bit float.
    Float,
    Char,
    String,
    /// Homogeneous sequence.
    Array(Box<TypeDescriptor>),
    /// Fixed-length heterogeneous sequence.
    Tuple(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Parse a header token such as `int` or `array(tuple(int, string))`.
    ///
    /// Whitespace around names and separators is ignored.
    pub fn parse(token: &str) -> Result<Self, TypeNameError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TypeNameError::Empty);
        }

        let Some(open) = token.find('(') else {
            return Self::scalar(token);
        };

        if !token.ends_with(')') {
            return Err(TypeNameError::Malformed(token.to_string()));
        }

        let name = token[..open].trim();
        let inner = &token[open + 1..token.len() - 1];
        let params = split_top_level(inner)
            .ok_or_else(|| TypeNameError::Malformed(token.to_string()))?
            .into_iter()
            .map(Self::parse)
            .collect::<Result<Vec<_>, _>>()?;

        match name {
            "array" => match <[TypeDescriptor; 1]>::try_from(params) {
                Ok([element]) => Ok(Self::Array(Box::new(element))),
                Err(params) => Err(TypeNameError::ParameterCount {
                    name: name.to_string(),
                    expected: "1",
                    found: params.len(),
                }),
            },
            "tuple" => {
                if params.is_empty() {
                    return Err(TypeNameError::ParameterCount {
                        name: name.to_string(),
                        expected: "at least 1",
                        found: 0,
                    });
                }
                Ok(Self::Tuple(params))
            }
            _ => Err(TypeNameError::Unknown(name.to_string())),
        }
    }

    fn scalar(name: &str) -> Result<Self, TypeNameError> {
        match name {
            "void" => Ok(Self::Void),
            "bool" => Ok(Self::Bool),
            "int" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "float" | "double" => Ok(Self::Float),
            "char" => Ok(Self::Char),
            "string" => Ok(Self::String),
            _ if name.contains(')') => Err(TypeNameError::Malformed(name.to_string())),
            _ => Err(TypeNameError::Unknown(name.to_string())),
        }
    }

    /// Returns true for [`TypeDescriptor::Void`].
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Long => f.write_str("long"),
            Self::Float => f.write_str("float"),
            Self::Char => f.write_str("char"),
            Self::String => f.write_str("string"),
            Self::Array(element) => write!(f, "array({element})"),
            Self::Tuple(elements) => {
                f.write_str("tuple(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Split on commas that are not nested inside parentheses.
///
/// Returns `None` when the parentheses do not balance.
fn split_top_level(input: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    if !input.trim().is_empty() || !parts.is_empty() {
        parts.push(&input[start..]);
    }
    Some(parts)
}
