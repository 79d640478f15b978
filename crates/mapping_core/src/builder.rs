//! Builder for accumulating diagnostics into a [`ValidationResult`].
//!
//! Every validation call owns one builder, appends diagnostics as rules
//! report them, and freezes it once with [`ValidationResultBuilder::build`].

use crate::{Diagnostic, Severity, ValidationResult};
use serde_json::{Map, Value};

/// Accumulates diagnostics for one validation call.
///
/// # Example
///
/// ```rust
/// use mapping_core::{Diagnostic, ValidationResultBuilder};
///
/// let mut builder = ValidationResultBuilder::new();
/// builder
///     .add_error(Diagnostic::error("missing_section", "No mappings section found in YAML").with_path("root"))
///     .add_info(Diagnostic::info("validation_summary", "Validation completed."));
///
/// let result = builder.build();
/// assert!(!result.is_valid());
/// assert_eq!(result.info().len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ValidationResultBuilder {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    info: Vec<Diagnostic>,
    performance_metrics: Option<Map<String, Value>>,
    validation_metadata: Option<Map<String, Value>>,
}

impl ValidationResultBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the errors bucket regardless of the diagnostic's severity.
    pub fn add_error(&mut self, diagnostic: Diagnostic) -> &mut Self {
        self.errors.push(diagnostic);
        self
    }

    /// Appends to the warnings bucket.
    pub fn add_warning(&mut self, diagnostic: Diagnostic) -> &mut Self {
        self.warnings.push(diagnostic);
        self
    }

    /// Appends to the info bucket.
    pub fn add_info(&mut self, diagnostic: Diagnostic) -> &mut Self {
        self.info.push(diagnostic);
        self
    }

    /// Appends a diagnostic to the bucket matching its own severity.
    ///
    /// Critical and error findings land in errors, warnings in warnings and
    /// info in info.
    pub fn push(&mut self, diagnostic: Diagnostic) -> &mut Self {
        match diagnostic.severity() {
            Severity::Critical | Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
            Severity::Info => self.info.push(diagnostic),
        }
        self
    }

    /// Appends several diagnostics, each bucketed by severity.
    pub fn push_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> &mut Self {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
        self
    }

    /// Appends every bucket of an existing result, keeping bucket membership.
    pub fn extend(&mut self, result: &ValidationResult) -> &mut Self {
        self.errors.extend(result.errors().iter().cloned());
        self.warnings.extend(result.warnings().iter().cloned());
        self.info.extend(result.info().iter().cloned());
        self
    }

    /// Same as [`extend`](Self::extend) for an owned result.
    pub fn absorb(&mut self, result: ValidationResult) -> &mut Self {
        let (errors, warnings, info) = result.into_parts();
        self.errors.extend(errors);
        self.warnings.extend(warnings);
        self.info.extend(info);
        self
    }

    pub fn set_performance_metrics(&mut self, metrics: Map<String, Value>) -> &mut Self {
        self.performance_metrics = Some(metrics);
        self
    }

    pub fn set_validation_metadata(&mut self, metadata: Map<String, Value>) -> &mut Self {
        self.validation_metadata = Some(metadata);
        self
    }

    /// Number of diagnostics in the errors bucket so far.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of diagnostics in the warnings bucket so far.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Freezes the builder into an immutable result.
    pub fn build(self) -> ValidationResult {
        ValidationResult::from_parts(
            self.errors,
            self.warnings,
            self.info,
            self.performance_metrics,
            self.validation_metadata,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_builder_is_valid() {
        let result = ValidationResultBuilder::new().build();
        assert!(result.is_valid());
        assert!(result.all_messages().is_empty());
    }

    #[test]
    fn test_add_error_keeps_overridden_severity() {
        let mut builder = ValidationResultBuilder::new();
        builder.add_error(Diagnostic::warning("orphaned_mapped_columns", "orphan"));
        let result = builder.build();

        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_push_buckets_by_severity() {
        let mut builder = ValidationResultBuilder::new();
        builder.push_all([
            Diagnostic::critical("a", "1"),
            Diagnostic::error("b", "2"),
            Diagnostic::warning("c", "3"),
            Diagnostic::info("d", "4"),
        ]);
        let result = builder.build();

        assert_eq!(result.errors().len(), 2);
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.info().len(), 1);
    }

    #[test]
    fn test_extend_preserves_buckets() {
        let mut inner = ValidationResultBuilder::new();
        inner.add_warning(Diagnostic::warning("w", "x"));
        let inner = inner.build();

        let mut outer = ValidationResultBuilder::new();
        outer.add_info(Diagnostic::info("i", "y")).extend(&inner);
        assert_eq!(outer.warning_count(), 1);

        let result = outer.build();
        assert!(result.is_valid());
        assert_eq!(result.info().len(), 1);
    }
}
