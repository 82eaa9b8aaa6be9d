//! Error handling and diagnostics for the Think language
//!
//! This module provides the error types for every stage of the
//! pipeline: lexing, parsing, validation, and execution.

use std::fmt;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

/// Result type alias for Think operations
pub type ThinkResult<T> = Result<T, ThinkError>;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Optional filename
    pub filename: Option<String>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize, filename: Option<String>) -> Self {
        Self {
            line,
            column,
            filename,
        }
    }

    /// Create a source location without a filename
    pub fn at(line: usize, column: usize) -> Self {
        Self::new(line, column, None)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref filename) = self.filename {
            write!(f, "{}:{}:{}", filename, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// A single structural defect found by the validator.
///
/// Validation errors are collected, not short-circuited: the validator
/// returns every defect it finds in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub message: String,
    pub location: SourceLocation,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.location)
    }
}

/// Classification of runtime failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedVariable,
    UndefinedCallable,
    TypeMismatch,
    DivisionByZero,
    IndexError,
    DictKeyError,
    /// Raised only when the optional loop guard is enabled via
    /// `ExecuteOptions::max_loop_iterations`
    IterationLimit,
}

impl RuntimeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UndefinedVariable => "undefined variable",
            Self::UndefinedCallable => "undefined callable",
            Self::TypeMismatch => "type mismatch",
            Self::DivisionByZero => "division by zero",
            Self::IndexError => "index error",
            Self::DictKeyError => "dict key error",
            Self::IterationLimit => "iteration limit exceeded",
        }
    }
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the Think language
#[derive(Debug, Clone)]
pub enum ThinkError {
    /// Lexical analysis error
    LexError {
        message: String,
        location: SourceLocation,
    },
    /// Parsing error
    ParseError {
        message: String,
        location: SourceLocation,
    },
    /// One or more structural rule violations
    Validation { errors: Vec<ValidationError> },
    /// Runtime error
    RuntimeError {
        kind: RuntimeErrorKind,
        message: String,
        location: SourceLocation,
    },
    /// Internal error (should not happen in normal operation)
    InternalError { message: String },
}

impl ThinkError {
    /// Create a new lexer error
    pub fn lex_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::LexError {
            message: message.into(),
            location,
        }
    }

    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }

    /// Wrap a non-empty validation error list
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self::Validation { errors }
    }

    /// Create a new runtime error
    pub fn runtime_error(
        kind: RuntimeErrorKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::RuntimeError {
            kind,
            message: message.into(),
            location,
        }
    }

    /// Create a new internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::LexError { .. } => "Lex Error",
            Self::ParseError { .. } => "Parse Error",
            Self::Validation { .. } => "Validation Error",
            Self::RuntimeError { .. } => "Runtime Error",
            Self::InternalError { .. } => "Internal Error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::LexError { message, .. }
            | Self::ParseError { message, .. }
            | Self::InternalError { message } => message.clone(),
            Self::RuntimeError { message, .. } => message.clone(),
            Self::Validation { errors } => errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Get the source location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::LexError { location, .. }
            | Self::ParseError { location, .. }
            | Self::RuntimeError { location, .. } => Some(location),
            Self::Validation { errors } => errors.first().map(|e| &e.location),
            Self::InternalError { .. } => None,
        }
    }

    /// Runtime error classification, if this is a runtime error
    pub fn runtime_kind(&self) -> Option<RuntimeErrorKind> {
        match self {
            Self::RuntimeError { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for ThinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { .. } => write!(f, "{}:\n{}", self.kind(), self.message()),
            Self::RuntimeError { kind, message, location } => {
                write!(f, "{} ({}): {} at {}", self.kind(), kind, message, location)
            }
            _ => {
                if let Some(location) = self.location() {
                    write!(f, "{}: {} at {}", self.kind(), self.message(), location)
                } else {
                    write!(f, "{}: {}", self.kind(), self.message())
                }
            }
        }
    }
}

impl std::error::Error for ThinkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::at(10, 5);
        assert_eq!(loc.to_string(), "10:5");

        let loc_with_file = SourceLocation::new(10, 5, Some("grades.think".to_string()));
        assert_eq!(loc_with_file.to_string(), "grades.think:10:5");
    }

    #[test]
    fn test_error_creation() {
        let loc = SourceLocation::at(1, 1);
        let err = ThinkError::lex_error("unexpected character", loc.clone());

        assert_eq!(err.kind(), "Lex Error");
        assert_eq!(err.message(), "unexpected character");
        assert_eq!(err.location(), Some(&loc));
    }

    #[test]
    fn test_error_display() {
        let loc = SourceLocation::at(5, 10);
        let err = ThinkError::parse_error("expected 'end'", loc);

        assert_eq!(err.to_string(), "Parse Error: expected 'end' at 5:10");
    }

    #[test]
    fn test_runtime_error_carries_kind() {
        let loc = SourceLocation::at(3, 7);
        let err =
            ThinkError::runtime_error(RuntimeErrorKind::DivisionByZero, "division by zero", loc);

        assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::DivisionByZero));
        assert!(err.to_string().contains("division by zero"));
        assert!(err.to_string().contains("3:7"));
    }

    #[test]
    fn test_validation_error_list_display() {
        let errors = vec![
            ValidationError::new("duplicate task name 'X'", SourceLocation::at(4, 1)),
            ValidationError::new("run references unknown task 'Y'", SourceLocation::at(9, 1)),
        ];
        let err = ThinkError::validation(errors);

        let rendered = err.to_string();
        assert!(rendered.contains("duplicate task name 'X' at 4:1"));
        assert!(rendered.contains("run references unknown task 'Y' at 9:1"));
    }
}
