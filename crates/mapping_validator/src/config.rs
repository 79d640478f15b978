//! Unified façade over the comprehensive validator.
//!
//! Besides whole-document validation, [`ConfigValidator`] validates single
//! mappings and bare operation chains by wrapping them in a synthetic
//! document, and computes descriptive statistics over transformations.

use crate::{ComprehensiveValidator, OperationHelp, OperationRegistry, timed_scope};
use mapping_core::document::{list_field, mapping_name_or_unknown, mappings, str_field};
use mapping_core::{Diagnostic, ValidationResult, ValidationResultBuilder};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Operations counted by [`ConfigValidator::validate_numeric_transformation_chain`].
pub const NUMERIC_CHAIN_OPERATIONS: [&str; 13] = [
    "round",
    "ceil",
    "floor",
    "add",
    "subtract",
    "multiply",
    "divide",
    "power",
    "sqrt",
    "abs",
    "mod",
    "parse_number",
    "parse_currency",
];

/// Operations counted as numeric by [`TransformationAnalysis`].
pub const NUMERIC_OPERATIONS: [&str; 17] = [
    "parse_number",
    "parse_currency",
    "round",
    "ceil",
    "floor",
    "add",
    "subtract",
    "multiply",
    "divide",
    "power",
    "sqrt",
    "abs",
    "mod",
    "min_value",
    "max_value",
    "clamp",
    "format_number",
];

pub const DEFAULT_OPERATIONS_DATA_TYPE: &str = "VARCHAR(255)";
pub const DEFAULT_NUMERIC_DATA_TYPE: &str = "DECIMAL(15,2)";

const LOGGED_MESSAGES: usize = 3;
const PRECISION_RISK_THRESHOLD: usize = 3;
const COMPLEX_CHAIN_THRESHOLD: usize = 3;

/// Validates job documents, single mappings and operation chains.
pub struct ConfigValidator {
    comprehensive: ComprehensiveValidator,
    registry: Arc<OperationRegistry>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self::with_registry(OperationRegistry::shared())
    }

    pub fn with_registry(registry: Arc<OperationRegistry>) -> Self {
        Self {
            comprehensive: ComprehensiveValidator::with_registry(Arc::clone(&registry)),
            registry,
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn validate(&self, document: &Value) -> ValidationResult {
        self.validate_job_config(document)
    }

    /// Runs comprehensive validation over a whole job document.
    pub fn validate_job_config(&self, document: &Value) -> ValidationResult {
        timed_scope("validate_job_config", |_| {
            let result = self.comprehensive.validate(document);

            if result.is_valid() {
                info!(component = "config_validator", "Job configuration validation passed");
                if result.has_warnings() {
                    warn!(
                        component = "config_validator",
                        warnings = result.warnings().len(),
                        "Job configuration has warnings"
                    );
                    log_first(result.warnings());
                }
            } else {
                error!(
                    component = "config_validator",
                    errors = result.errors().len(),
                    "Job configuration validation failed"
                );
                log_first(result.errors());
            }

            result
        })
    }

    /// Validates one mapping as if it were the only one in the document.
    pub fn validate_mapping_config(&self, mapping: &Value) -> ValidationResult {
        let name = mapping_name_or_unknown(mapping);
        let result = self
            .comprehensive
            .validate(&json!({ "mappings": [mapping] }));

        if result.is_valid() {
            info!(component = "config_validator", mapping = %name, "Mapping validation passed");
        } else {
            error!(component = "config_validator", mapping = %name, "Mapping validation failed");
            log_first(result.errors());
        }
        if result.has_warnings() {
            warn!(component = "config_validator", mapping = %name, "Mapping validation warnings");
            log_first(result.warnings());
        }

        result
    }

    /// Validates an operation chain inside a synthetic string transformation.
    ///
    /// Only errors and warnings whose path contains `transformations` are
    /// kept, followed by an `operation_validation_summary` info.
    pub fn validate_transformation_operations(
        &self,
        operations: &[Value],
        data_type: &str,
    ) -> ValidationResult {
        let mapping = json!({
            "mapping_name": "test_operations",
            "column_transformations": [{
                "source_alias": "test_source",
                "target_column": "test_target",
                "data_type": data_type,
                "transformation_type": "string_manipulation",
                "transformations": operations,
            }]
        });
        let result = self.validate_mapping_config(&mapping);

        let on_operations =
            |d: &&Diagnostic| d.path().is_some_and(|p| p.contains("transformations"));
        let mut builder = ValidationResultBuilder::new();
        for diagnostic in result.errors().iter().filter(on_operations) {
            builder.add_error(diagnostic.clone());
        }
        for diagnostic in result.warnings().iter().filter(on_operations) {
            builder.add_warning(diagnostic.clone());
        }
        builder.add_info(
            Diagnostic::info(
                "operation_validation_summary",
                format!("Validated {} transformation operations", operations.len()),
            )
            .with_path("operations"),
        );
        builder.build()
    }

    /// Validates a numeric operation chain and adds precision analysis.
    pub fn validate_numeric_transformation_chain(
        &self,
        operations: &[Value],
        data_type: &str,
    ) -> ValidationResult {
        let document = json!({
            "mappings": [{
                "mapping_name": "test_numeric_chain",
                "column_transformations": [{
                    "source_alias": "test_numeric_source",
                    "target_column": "test_numeric_target",
                    "data_type": data_type,
                    "transformation_type": "type_conversion",
                    "transformations": operations,
                }]
            }]
        });
        let result = self.validate_job_config(&document);

        let mut builder = ValidationResultBuilder::new();
        for diagnostic in result.errors() {
            builder.add_error(diagnostic.clone());
        }
        for diagnostic in result.warnings() {
            builder.add_warning(diagnostic.clone());
        }

        let numeric = operations
            .iter()
            .filter_map(|op| str_field(op, "type"))
            .filter(|kind| NUMERIC_CHAIN_OPERATIONS.contains(kind))
            .count();
        if numeric == 0 {
            return builder.build();
        }

        builder.add_info(
            Diagnostic::info(
                "numeric_analysis",
                format!(
                    "Found {numeric} numeric operations in chain of {} total operations",
                    operations.len()
                ),
            )
            .with_path("numeric_operations"),
        );
        if numeric > PRECISION_RISK_THRESHOLD {
            builder.add_warning(
                Diagnostic::warning(
                    "numeric_precision_risk",
                    format!(
                        "Long numeric operation chain ({numeric} operations) may cause precision loss"
                    ),
                )
                .with_path("numeric_operations")
                .with_suggestion(
                    "Consider using fewer operations or sql_expression for complex calculations",
                ),
            );
        }
        let upper = data_type.to_uppercase();
        if upper.contains("DECIMAL") || upper.contains("NUMERIC") {
            builder.add_info(
                Diagnostic::info(
                    "data_type_compatibility",
                    format!("Numeric operations are compatible with target type: {data_type}"),
                )
                .with_path("data_type"),
            );
        }

        builder.build()
    }

    /// Validity and error messages only.
    pub fn legacy_job_check(&self, document: &Value) -> (bool, Vec<String>) {
        let result = self.validate_job_config(document);
        let messages = result
            .errors()
            .iter()
            .map(|d| d.message().to_string())
            .collect();
        (result.is_valid(), messages)
    }

    pub fn analyze_transformations(&self, document: &Value) -> TransformationAnalysis {
        TransformationAnalysis::of(document)
    }

    pub fn operation_help(&self, name: &str) -> Option<OperationHelp> {
        self.registry.help(name)
    }

    /// Operation names, optionally restricted to one category.
    pub fn available_operations(&self, category: Option<&str>) -> Vec<String> {
        match category {
            Some(category) => self.registry.operations_by_category(category).to_vec(),
            None => self.registry.operation_names().to_vec(),
        }
    }

    pub fn operation_suggestions(&self, partial: &str) -> Vec<String> {
        self.registry
            .suggestions(partial, 5)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

fn log_first(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics.iter().take(LOGGED_MESSAGES) {
        warn!(component = "config_validator", kind = diagnostic.kind(), "  - {}", diagnostic.message());
    }
}

/// Descriptive statistics over every column transformation of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformationAnalysis {
    pub transformation_types: BTreeMap<String, usize>,
    pub operation_types: BTreeMap<String, usize>,
    /// Mean operation count over transformations with at least one operation
    pub avg_chain_length: f64,
    pub max_chain_length: usize,
    /// Base data type (before any `(`), upper-cased
    pub data_type_distribution: BTreeMap<String, usize>,
    pub numeric_transformations: usize,
    /// Transformations with more than three operations
    pub complex_chains: usize,
}

impl TransformationAnalysis {
    pub fn of(document: &Value) -> Self {
        let mut analysis = Self::default();
        let mut chains = 0usize;
        let mut total_operations = 0usize;

        for mapping in mappings(document) {
            for transformation in list_field(mapping, "column_transformations") {
                let kind = str_field(transformation, "transformation_type").unwrap_or("unknown");
                *analysis.transformation_types.entry(kind.to_string()).or_default() += 1;

                let data_type = str_field(transformation, "data_type").unwrap_or("unknown");
                let base = data_type.split('(').next().unwrap_or_default().to_uppercase();
                *analysis.data_type_distribution.entry(base).or_default() += 1;

                let operations = list_field(transformation, "transformations");
                if operations.len() > COMPLEX_CHAIN_THRESHOLD {
                    analysis.complex_chains += 1;
                }
                if operations.is_empty() {
                    continue;
                }
                chains += 1;
                total_operations += operations.len();
                analysis.max_chain_length = analysis.max_chain_length.max(operations.len());

                for operation in operations {
                    let op = str_field(operation, "type").unwrap_or("unknown");
                    if NUMERIC_OPERATIONS.contains(&op) {
                        analysis.numeric_transformations += 1;
                    }
                    *analysis.operation_types.entry(op.to_string()).or_default() += 1;
                }
            }
        }

        if chains > 0 {
            let mean = total_operations as f64 / chains as f64;
            analysis.avg_chain_length = (mean * 100.0).round() / 100.0;
        }
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operation_chain_filtering() {
        let validator = ConfigValidator::new();
        let operations = vec![
            json!({"type": "trim"}),
            json!({"type": "divide", "parameters": {"factor": 0}}),
            json!({"type": "frobnicate"}),
        ];
        let result =
            validator.validate_transformation_operations(&operations, DEFAULT_OPERATIONS_DATA_TYPE);

        assert_eq!(
            result.error_types(),
            vec!["division_by_zero", "invalid_operation_type"]
        );
        assert!(
            result
                .all_messages()
                .iter()
                .all(|d| d.kind() == "operation_validation_summary"
                    || d.path().is_some_and(|p| p.contains("transformations")))
        );
        let summary = result.messages_by_type("operation_validation_summary");
        assert_eq!(summary[0].message(), "Validated 3 transformation operations");
        assert_eq!(summary[0].path(), Some("operations"));
    }

    #[test]
    fn test_numeric_chain_analysis() {
        let validator = ConfigValidator::new();
        let operations = vec![
            json!({"type": "parse_number"}),
            json!({"type": "multiply", "parameters": {"factor": 1.1}}),
            json!({"type": "add", "parameters": {"value": 2}}),
            json!({"type": "round", "parameters": {"precision": 2}}),
        ];
        let result =
            validator.validate_numeric_transformation_chain(&operations, DEFAULT_NUMERIC_DATA_TYPE);

        assert!(result.is_valid(), "{:?}", result.errors());
        assert_eq!(result.warning_types(), vec!["numeric_precision_risk"]);
        let kinds: Vec<&str> = result.info().iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, vec!["numeric_analysis", "data_type_compatibility"]);
        assert_eq!(
            result.info()[0].message(),
            "Found 4 numeric operations in chain of 4 total operations"
        );
    }

    #[test]
    fn test_non_numeric_chain_has_no_analysis() {
        let result = ConfigValidator::new()
            .validate_numeric_transformation_chain(&[json!({"type": "trim"})], "VARCHAR(10)");
        assert!(result.info().is_empty());
    }

    #[test]
    fn test_legacy_job_check() {
        let (valid, messages) = ConfigValidator::new().legacy_job_check(&json!({"settings": {}}));
        assert!(!valid);
        assert_eq!(messages, vec!["No mappings section found in YAML".to_string()]);
    }

    #[test]
    fn test_analyze_transformations() {
        let document = json!({
            "mappings": [{
                "column_transformations": [
                    {"transformation_type": "direct_mapping", "data_type": "varchar(20)"},
                    {
                        "transformation_type": "numeric_transformation",
                        "data_type": "DECIMAL(10,2)",
                        "transformations": [
                            {"type": "parse_number"}, {"type": "multiply"},
                            {"type": "round"}, {"type": "clamp"}
                        ]
                    },
                    {
                        "transformation_type": "string_manipulation",
                        "data_type": "VARCHAR(5)",
                        "transformations": [{"type": "trim"}]
                    }
                ]
            }]
        });
        let analysis = ConfigValidator::new().analyze_transformations(&document);

        assert_eq!(analysis.max_chain_length, 4);
        assert_eq!(analysis.avg_chain_length, 2.5);
        assert_eq!(analysis.data_type_distribution["VARCHAR"], 2);
        assert_eq!(analysis.data_type_distribution["DECIMAL"], 1);
        assert_eq!(analysis.numeric_transformations, 4);
        assert_eq!(analysis.complex_chains, 1);
        assert_eq!(analysis.operation_types.get("trim"), Some(&1));
    }

    #[test]
    fn test_available_operations() {
        let validator = ConfigValidator::new();
        assert_eq!(
            validator.available_operations(Some("string")),
            vec!["trim", "lowercase", "uppercase", "replace"]
        );
        assert_eq!(validator.available_operations(None).len(), 20);
        assert!(validator.operation_help("round").is_some());
        assert!(validator.operation_suggestions("up").contains(&"uppercase".to_string()));
    }
}
