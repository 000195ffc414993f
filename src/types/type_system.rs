//! Type tags for tinyjs
//!
//! The language is dynamically typed. A tag is an advisory guess derived from
//! the shape of an initializer, never a constraint on later assignments.

use std::fmt;

/// Inferred type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeTag {
    /// Nothing could be inferred
    #[default]
    Unknown,
    Number,
    String,
    Array,
    Function,
    /// Explicitly dynamic (function parameters, some native signatures)
    Any,
    /// Return tag of functions that produce no value
    Void,
}

impl TypeTag {
    /// Whether a value of this tag may be indexed with `[]`
    ///
    /// Unknown values are assumed indexable; `any` parameters are not.
    pub fn is_indexable(&self) -> bool {
        matches!(self, Self::Array | Self::String | Self::Unknown)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Function => "function",
            Self::Any => "any",
            Self::Void => "void",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexable() {
        assert!(TypeTag::Array.is_indexable());
        assert!(TypeTag::String.is_indexable());
        assert!(TypeTag::Unknown.is_indexable());
        assert!(!TypeTag::Number.is_indexable());
        assert!(!TypeTag::Any.is_indexable());
        assert!(!TypeTag::Function.is_indexable());
        assert_eq!(TypeTag::default(), TypeTag::Unknown);
        assert_eq!(TypeTag::Array.to_string(), "array");
    }
}
