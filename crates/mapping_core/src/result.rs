//! The frozen outcome of one validation call.

use crate::{Diagnostic, Result, Severity, ValidationResultBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Diagnostics produced by one validation call, split into three buckets.
///
/// `is_valid` is true exactly when the errors bucket is empty. Results are
/// produced by [`ValidationResultBuilder::build`] and never mutated
/// afterwards; combining operations such as [`merge`](Self::merge) return new
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    info: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    performance_metrics: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation_metadata: Option<Map<String, Value>>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::from_parts(Vec::new(), Vec::new(), Vec::new(), None, None)
    }
}

impl ValidationResult {
    pub(crate) fn from_parts(
        errors: Vec<Diagnostic>,
        warnings: Vec<Diagnostic>,
        info: Vec<Diagnostic>,
        performance_metrics: Option<Map<String, Value>>,
        validation_metadata: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            info,
            performance_metrics,
            validation_metadata,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings, self.info)
    }

    /// A valid result carrying one `validation_success` info message.
    pub fn success(message: impl Into<String>) -> Self {
        let mut builder = ValidationResultBuilder::new();
        builder.add_info(Diagnostic::info("validation_success", message));
        builder.build()
    }

    /// An invalid result carrying a single error.
    pub fn error(kind: impl Into<String>, message: impl Into<String>, path: Option<&str>) -> Self {
        let mut builder = ValidationResultBuilder::new();
        let diagnostic = Diagnostic::error(kind, message);
        builder.add_error(match path {
            Some(path) => diagnostic.with_path(path),
            None => diagnostic,
        });
        builder.build()
    }

    /// Converts a failure that happened outside any rule into a single
    /// critical `validation_exception`.
    pub fn from_exception(error: impl fmt::Display, path: Option<&str>, context: &str) -> Self {
        let text = error.to_string();
        let mut diagnostic =
            Diagnostic::critical("validation_exception", format!("{context}: {text}"))
                .with_extra("exception", text);
        if let Some(path) = path {
            diagnostic = diagnostic.with_path(path);
        }
        let mut builder = ValidationResultBuilder::new();
        builder.add_error(diagnostic);
        builder.build()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn info(&self) -> &[Diagnostic] {
        &self.info
    }

    pub fn performance_metrics(&self) -> Option<&Map<String, Value>> {
        self.performance_metrics.as_ref()
    }

    pub fn validation_metadata(&self) -> Option<&Map<String, Value>> {
        self.validation_metadata.as_ref()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_info(&self) -> bool {
        !self.info.is_empty()
    }

    /// Errors, then warnings, then info.
    pub fn all_messages(&self) -> Vec<&Diagnostic> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .chain(&self.info)
            .collect()
    }

    pub fn errors_by_type(&self, kind: &str) -> Vec<&Diagnostic> {
        self.errors.iter().filter(|d| d.kind() == kind).collect()
    }

    pub fn warnings_by_type(&self, kind: &str) -> Vec<&Diagnostic> {
        self.warnings.iter().filter(|d| d.kind() == kind).collect()
    }

    /// Diagnostics of any bucket with the given kind.
    pub fn messages_by_type(&self, kind: &str) -> Vec<&Diagnostic> {
        self.all_messages()
            .into_iter()
            .filter(|d| d.kind() == kind)
            .collect()
    }

    pub fn critical_errors(&self) -> Vec<&Diagnostic> {
        self.messages_by_severity(Severity::Critical)
    }

    pub fn messages_by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.all_messages()
            .into_iter()
            .filter(|d| d.severity() == severity)
            .collect()
    }

    /// Diagnostics whose path starts with `prefix`.
    pub fn messages_by_path(&self, prefix: &str) -> Vec<&Diagnostic> {
        self.all_messages()
            .into_iter()
            .filter(|d| d.path().is_some_and(|p| p.starts_with(prefix)))
            .collect()
    }

    pub fn messages_by_mapping(&self, mapping_name: &str) -> Vec<&Diagnostic> {
        self.all_messages()
            .into_iter()
            .filter(|d| d.mapping_name() == Some(mapping_name))
            .collect()
    }

    pub fn has_operation_errors(&self) -> bool {
        self.errors.iter().any(|d| d.kind().contains("operation"))
    }

    pub fn has_parameter_errors(&self) -> bool {
        self.errors.iter().any(|d| d.kind().contains("parameter"))
    }

    /// Unique suggestions in first-seen order.
    pub fn suggestions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.all_messages()
            .into_iter()
            .filter_map(Diagnostic::suggestion)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Unique error kinds in first-seen order.
    pub fn error_types(&self) -> Vec<&str> {
        unique_kinds(&self.errors)
    }

    /// Unique warning kinds in first-seen order.
    pub fn warning_types(&self) -> Vec<&str> {
        unique_kinds(&self.warnings)
    }

    /// Names of every mapping mentioned by any diagnostic, sorted.
    pub fn affected_mappings(&self) -> BTreeSet<&str> {
        self.all_messages()
            .into_iter()
            .filter_map(Diagnostic::mapping_name)
            .collect()
    }

    /// Error count per kind, in first-seen order.
    pub fn error_summary(&self) -> Vec<(&str, usize)> {
        count_kinds(&self.errors)
    }

    /// Warning count per kind, in first-seen order.
    pub fn warning_summary(&self) -> Vec<(&str, usize)> {
        count_kinds(&self.warnings)
    }

    /// Keeps diagnostics at or above `min`, re-bucketing each by its own
    /// severity.
    pub fn filter_by_severity(&self, min: Severity) -> ValidationResult {
        let mut builder = ValidationResultBuilder::new();
        builder.push_all(
            self.all_messages()
                .into_iter()
                .filter(|d| d.severity() >= min)
                .cloned(),
        );
        if let Some(metrics) = &self.performance_metrics {
            builder.set_performance_metrics(metrics.clone());
        }
        if let Some(metadata) = &self.validation_metadata {
            builder.set_validation_metadata(metadata.clone());
        }
        builder.build()
    }

    /// Concatenates both results bucket by bucket, `self` first.
    ///
    /// Validity is the conjunction of both sides. Metrics and metadata come
    /// from `self` when present, otherwise from `other`. No deduplication
    /// happens here.
    pub fn merge(&self, other: &ValidationResult) -> ValidationResult {
        let concat = |a: &[Diagnostic], b: &[Diagnostic]| -> Vec<Diagnostic> {
            a.iter().chain(b).cloned().collect()
        };
        let mut merged = Self::from_parts(
            concat(&self.errors, &other.errors),
            concat(&self.warnings, &other.warnings),
            concat(&self.info, &other.info),
            self.performance_metrics
                .clone()
                .or_else(|| other.performance_metrics.clone()),
            self.validation_metadata
                .clone()
                .or_else(|| other.validation_metadata.clone()),
        );
        merged.is_valid = self.is_valid && other.is_valid;
        merged
    }

    /// Drops repeated errors and warnings sharing `(kind, message, path)`,
    /// keeping the first occurrence.
    pub fn deduplicated(&self) -> ValidationResult {
        let dedup = |items: &[Diagnostic]| -> Vec<Diagnostic> {
            let mut seen = HashSet::new();
            items
                .iter()
                .filter(|d| seen.insert(d.identity()))
                .cloned()
                .collect()
        };
        let mut result = Self::from_parts(
            dedup(&self.errors),
            dedup(&self.warnings),
            self.info.clone(),
            self.performance_metrics.clone(),
            self.validation_metadata.clone(),
        );
        result.is_valid = self.is_valid && result.errors.is_empty();
        result
    }

    /// Returns a copy with the given performance metrics attached.
    pub fn with_performance_metrics(mut self, metrics: Map<String, Value>) -> Self {
        self.performance_metrics = Some(metrics);
        self
    }

    /// Returns a copy with the given metadata attached.
    pub fn with_validation_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.validation_metadata = Some(metadata);
        self
    }

    /// Report object with the three buckets and a summary section.
    pub fn to_report(&self) -> Value {
        let mut report = json!({
            "is_valid": self.is_valid,
            "errors": self.errors,
            "warnings": self.warnings,
            "info": self.info,
            "summary": {
                "error_count": self.errors.len(),
                "warning_count": self.warnings.len(),
                "info_count": self.info.len(),
                "error_types": self.error_types(),
                "warning_types": self.warning_types(),
                "affected_mappings": self.affected_mappings(),
            }
        });
        if let Some(obj) = report.as_object_mut() {
            if let Some(metrics) = &self.performance_metrics {
                obj.insert("performance_metrics".into(), Value::Object(metrics.clone()));
            }
            if let Some(metadata) = &self.validation_metadata {
                obj.insert("validation_metadata".into(), Value::Object(metadata.clone()));
            }
        }
        report
    }

    /// Pretty-printed JSON of [`to_report`](Self::to_report).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_report())?)
    }
}

fn unique_kinds(items: &[Diagnostic]) -> Vec<&str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(Diagnostic::kind)
        .filter(|k| seen.insert(*k))
        .collect()
}

fn count_kinds(items: &[Diagnostic]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(kind, _)| *kind == item.kind()) {
            Some((_, n)) => *n += 1,
            None => counts.push((item.kind(), 1)),
        }
    }
    counts
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ValidationResult({}, Errors: {}, Warnings: {}, Info: {})",
            if self.is_valid { "VALID" } else { "INVALID" },
            self.errors.len(),
            self.warnings.len(),
            self.info.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ValidationResult {
        let mut builder = ValidationResultBuilder::new();
        builder
            .add_error(
                Diagnostic::error("invalid_operation_type", "bad op")
                    .with_path("mappings[0].column_transformations[0].transformations[0]")
                    .with_mapping("orders")
                    .with_suggestion("Did you mean one of: round?"),
            )
            .add_error(
                Diagnostic::critical("sql_security_risk", "danger")
                    .with_path("mappings[1].source_columns_interested[0]")
                    .with_mapping("customers"),
            )
            .add_warning(
                Diagnostic::warning("invalid_data_type_pattern", "odd type")
                    .with_path("mappings[0].column_transformations[1]")
                    .with_mapping("orders")
                    .with_suggestion("Did you mean one of: round?"),
            )
            .add_info(Diagnostic::info("validation_summary", "done"));
        builder.build()
    }

    #[test]
    fn test_queries() {
        let result = sample();
        assert!(!result.is_valid());
        assert_eq!(result.all_messages().len(), 4);
        assert_eq!(result.critical_errors().len(), 1);
        assert_eq!(result.messages_by_path("mappings[0]").len(), 2);
        assert_eq!(result.messages_by_mapping("customers").len(), 1);
        assert!(result.has_operation_errors());
        assert!(!result.has_parameter_errors());
        assert_eq!(result.suggestions(), vec!["Did you mean one of: round?"]);
        assert_eq!(
            result.affected_mappings().into_iter().collect::<Vec<_>>(),
            vec!["customers", "orders"]
        );
        assert_eq!(
            result.error_types(),
            vec!["invalid_operation_type", "sql_security_risk"]
        );
    }

    #[test]
    fn test_merge_concatenates_and_ands_validity() {
        let a = ValidationResult::success("ok");
        let b = sample();

        let merged = a.merge(&b);
        assert!(!merged.is_valid());
        assert_eq!(merged.errors().len(), 2);
        assert_eq!(merged.info().len(), 2);
        assert_eq!(merged.info()[0].kind(), "validation_success");

        let both_valid = a.merge(&a);
        assert!(both_valid.is_valid());
        assert_eq!(both_valid.info().len(), 2);
    }

    #[test]
    fn test_merge_prefers_own_metrics() {
        let mut left = Map::new();
        left.insert("duration_seconds".into(), json!(1.0));
        let mut right = Map::new();
        right.insert("duration_seconds".into(), json!(2.0));

        let a = ValidationResult::default().with_performance_metrics(left.clone());
        let b = ValidationResult::default().with_performance_metrics(right.clone());
        assert_eq!(a.merge(&b).performance_metrics(), Some(&left));
        assert_eq!(
            ValidationResult::default().merge(&b).performance_metrics(),
            Some(&right)
        );
    }

    #[test]
    fn test_filter_by_severity_rebuckets() {
        let mut builder = ValidationResultBuilder::new();
        builder
            .add_error(Diagnostic::warning("orphaned_mapped_columns", "orphan"))
            .add_info(Diagnostic::info("validation_summary", "done"));
        let result = builder.build();
        assert!(!result.is_valid());

        let filtered = result.filter_by_severity(Severity::Warning);
        assert!(filtered.is_valid());
        assert_eq!(filtered.warnings().len(), 1);
        assert!(filtered.info().is_empty());
    }

    #[test]
    fn test_deduplicated() {
        let mut builder = ValidationResultBuilder::new();
        let duplicate = Diagnostic::error("duplicate_target_column", "dup").with_path("p");
        builder
            .add_error(duplicate.clone())
            .add_error(duplicate)
            .add_error(Diagnostic::error("duplicate_target_column", "dup").with_path("q"));
        let result = builder.build().deduplicated();
        assert_eq!(result.errors().len(), 2);
    }

    #[test]
    fn test_error_summary_counts_in_order() {
        let mut builder = ValidationResultBuilder::new();
        builder
            .add_error(Diagnostic::error("b", "1"))
            .add_error(Diagnostic::error("a", "2"))
            .add_error(Diagnostic::error("b", "3"));
        assert_eq!(builder.build().error_summary(), vec![("b", 2), ("a", 1)]);
    }

    #[test]
    fn test_from_exception() {
        let result = ValidationResult::from_exception("file not found", Some("root"), "YAML parsing error");
        assert!(!result.is_valid());
        let diagnostic = &result.errors()[0];
        assert_eq!(diagnostic.kind(), "validation_exception");
        assert_eq!(diagnostic.severity(), Severity::Critical);
        assert_eq!(diagnostic.message(), "YAML parsing error: file not found");
        assert_eq!(diagnostic.extra("exception"), Some(&json!("file not found")));
    }

    #[test]
    fn test_display_and_report() {
        let result = sample();
        assert_eq!(
            result.to_string(),
            "ValidationResult(INVALID, Errors: 2, Warnings: 1, Info: 1)"
        );
        let report = result.to_report();
        assert_eq!(report["summary"]["error_count"], json!(2));
        assert_eq!(report["errors"][1]["type"], json!("sql_security_risk"));
        assert!(result.to_json().unwrap().contains("\"is_valid\": false"));
    }
}
