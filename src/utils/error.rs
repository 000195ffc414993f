//! Diagnostics for tinyjs
//!
//! Every problem found by the front end is one `Error` value. The variants keep
//! the offending name or token text so callers can match on structure; the
//! `Display` impl is the only place where prose is produced.

use crate::utils::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Lexical,
    Syntax,
    Semantic,
}

/// Front-end diagnostic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexical Errors ====================

    #[error("Lexical Error: unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, span: Span },

    #[error("Lexical Error: unterminated string literal")]
    UnterminatedString { span: Span },

    // ==================== Syntax Errors ====================

    #[error("Syntax Error: expected {expected}, found {found} (at '{literal}')")]
    UnexpectedToken {
        expected: String,
        found: String,
        literal: String,
        span: Span,
    },

    #[error("Syntax Error: expected expression, found {found} (at '{literal}')")]
    ExpectedExpr {
        found: String,
        literal: String,
        span: Span,
    },

    #[error("Syntax Error: left-hand side of assignment is not assignable")]
    InvalidAssignTarget { span: Span },

    // ==================== Semantic Errors ====================

    #[error("Semantic Error: Identifier '{name}' was already declared as '{previous}' in this scope.")]
    AlreadyDeclared {
        name: String,
        previous: String,
        span: Span,
    },

    #[error("Semantic Error: Use of undeclared identifier '{name}'.")]
    UndeclaredIdentifier { name: String, span: Span },

    #[error("Semantic Error: Variable '{name}' was not declared before being assigned.")]
    AssignToUndeclared { name: String, span: Span },

    #[error("Semantic Error: Cannot reassign constant '{name}'.")]
    AssignToConst { name: String, span: Span },

    #[error("Semantic Error: Constant '{name}' must be initialized.")]
    UninitializedConst { name: String, span: Span },

    #[error("Semantic Error: Function '{name}' was not declared.")]
    UndeclaredFunction { name: String, span: Span },

    #[error("Semantic Error: '{name}' is not a function.")]
    NotCallable { name: String, span: Span },

    #[error("Semantic Error: Function '{name}' expects {expected} argument(s), but received {got}.")]
    ArgCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        span: Span,
    },

    #[error("Semantic Error: Variable '{name}' of type '{ty}' is not indexable.")]
    NotIndexable { name: String, ty: String, span: Span },

    #[error("Semantic Error: 'return' statement outside of a function.")]
    ReturnOutsideFunction { span: Span },

    #[error("Semantic Error: Duplicate parameter '{name}' in function '{function}'.")]
    DuplicateParameter {
        name: String,
        function: String,
        span: Span,
    },
}

impl Error {
    /// Stage that produced this diagnostic
    pub fn category(&self) -> Category {
        match self {
            Self::UnexpectedCharacter { .. } | Self::UnterminatedString { .. } => Category::Lexical,
            Self::UnexpectedToken { .. } | Self::ExpectedExpr { .. } | Self::InvalidAssignTarget { .. } => {
                Category::Syntax
            }
            _ => Category::Semantic,
        }
    }

    /// Name of the identifier the diagnostic is about, if any
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::AlreadyDeclared { name, .. }
            | Self::UndeclaredIdentifier { name, .. }
            | Self::AssignToUndeclared { name, .. }
            | Self::AssignToConst { name, .. }
            | Self::UninitializedConst { name, .. }
            | Self::UndeclaredFunction { name, .. }
            | Self::NotCallable { name, .. }
            | Self::ArgCountMismatch { name, .. }
            | Self::NotIndexable { name, .. }
            | Self::DuplicateParameter { name, .. } => Some(name),
            Self::UnexpectedToken { literal, .. } | Self::ExpectedExpr { literal, .. } => Some(literal),
            _ => None,
        }
    }

    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedCharacter { span, .. } => *span,
            Self::UnterminatedString { span } => *span,
            Self::UnexpectedToken { span, .. } => *span,
            Self::ExpectedExpr { span, .. } => *span,
            Self::InvalidAssignTarget { span } => *span,
            Self::AlreadyDeclared { span, .. } => *span,
            Self::UndeclaredIdentifier { span, .. } => *span,
            Self::AssignToUndeclared { span, .. } => *span,
            Self::AssignToConst { span, .. } => *span,
            Self::UninitializedConst { span, .. } => *span,
            Self::UndeclaredFunction { span, .. } => *span,
            Self::NotCallable { span, .. } => *span,
            Self::ArgCountMismatch { span, .. } => *span,
            Self::NotIndexable { span, .. } => *span,
            Self::ReturnOutsideFunction { span } => *span,
            Self::DuplicateParameter { span, .. } => *span,
        }
    }
}
