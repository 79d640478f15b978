//! Error types for the diagnostic model.
//!
//! Validation findings are never errors in this sense: they are accumulated
//! as [`Diagnostic`](crate::Diagnostic)s. These errors cover misuse of the
//! model itself, such as parsing an unknown severity name or failing to
//! serialize a report.

use thiserror::Error;

/// Result type for diagnostic model operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for the diagnostic model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Severity name not recognized
    #[error("Unknown severity '{0}': expected one of info, warning, error, critical")]
    UnknownSeverity(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
