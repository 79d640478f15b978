//! Error types for rule execution and validator configuration.

use mapping_parser::ParserError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for validator configuration and I/O.
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Failure inside a single rule function.
///
/// The rule engine never propagates these: each one becomes a
/// `rule_execution_error` diagnostic for the rule that raised it.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A built-in regular expression failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// A node had a shape the rule cannot work with
    #[error("Unexpected value at '{path}': expected {expected}, found {found}")]
    Shape {
        path: String,
        expected: String,
        found: String,
    },

    /// Generic rule failure
    #[error("{0}")]
    General(String),
}

impl RuleError {
    /// Creates a new pattern compilation error.
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Creates a new shape mismatch error.
    pub fn shape(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Shape {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a new generic error.
    pub fn general(message: impl Into<String>) -> Self {
        Self::General(message.into())
    }
}

/// Errors raised while configuring validators or reading inputs.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Unknown validation mode name
    #[error("Unknown validation mode: {0}")]
    UnknownMode(String),

    /// Unknown validator kind name
    #[error("Unknown validator kind: {0}")]
    UnknownKind(String),

    /// Directory passed to a directory scan does not exist
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Parsing failed
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
