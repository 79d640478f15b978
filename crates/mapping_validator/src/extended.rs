//! Rules for the job settings and the column sections of each mapping.
//!
//! [`ComprehensiveValidator`] adds these on top of [`StructuralValidator`]:
//! partition settings, load mode and environment on the `settings` section;
//! `columns_mapping`, `column_duplications`, `source_columns_interested`
//! (alias format and SQL security) and cross-section consistency on every
//! mapping.

use crate::consistency::validate_column_consistency;
use crate::{
    AliasShape, OperationRegistry, RuleEngine, RuleError, RuleOutcome, StructuralValidator,
    extract_alias_with_shape, is_valid_identifier, normalize_whitespace, scan_expression,
    scope::metric_count, timed_scope,
};
use mapping_core::document::{mapping_label, render, type_name};
use mapping_core::{
    Diagnostic, Severity, ValidationContext, ValidationResult, ValidationResultBuilder,
};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Keys accepted in `settings.default_partition_settings`.
pub const PARTITION_SETTINGS: [&str; 12] = [
    "partition_enabled",
    "dynamic_partition_calculation",
    "partition_refresh_frequency",
    "average_row_size",
    "target_partition_size_mb",
    "partition_buffer_percent",
    "num_partitions",
    "num_partitions_for_delta",
    "partition_lowerbound",
    "partition_upperbound",
    "allow_num_partitions_adjustment",
    "allow_num_partitions_for_delta_adjustment",
];

/// Inclusive bounds of the numeric partition settings.
pub const PARTITION_RANGES: [(&str, i64, i64); 5] = [
    ("average_row_size", 1, 1_000_000),
    ("target_partition_size_mb", 1, 1000),
    ("partition_buffer_percent", 0, 100),
    ("num_partitions", 1, 10_000),
    ("num_partitions_for_delta", 1, 10_000),
];

pub const LOAD_MODES: [&str; 3] = ["full", "delta", "incremental"];
pub const ENVIRONMENTS: [&str; 5] = ["dev", "test", "stage", "prod", "production"];

pub(crate) const SETTINGS_CATEGORIES: &[&str] = &["settings", "partition"];
pub(crate) const COLUMN_CATEGORIES: &[&str] =
    &["mapping", "columns", "duplications", "source", "consistency"];

static INVALID_COLUMN_CHARS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]"));

fn invalid_column_chars() -> Result<&'static Regex, RuleError> {
    INVALID_COLUMN_CHARS
        .as_ref()
        .map_err(|e| RuleError::pattern(r"[^a-zA-Z0-9_]", e.to_string()))
}

/// Validates every section of a job document.
pub struct ComprehensiveValidator {
    structural: StructuralValidator,
    engine: RuleEngine,
}

impl Default for ComprehensiveValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ComprehensiveValidator {
    pub fn new() -> Self {
        Self::with_registry(OperationRegistry::shared())
    }

    pub fn with_registry(registry: Arc<OperationRegistry>) -> Self {
        let mut engine = RuleEngine::new();

        engine.register_rule(
            "validate_default_partition_settings",
            "Validate default partition settings structure and values",
            Severity::Error,
            &["structure", "partition", "settings"],
            validate_default_partition_settings,
        );
        engine.register_rule(
            "validate_column_mapping",
            "Validate column mapping structure and consistency",
            Severity::Error,
            &["structure", "mapping", "columns"],
            validate_column_mapping,
        );
        engine.register_rule(
            "validate_column_duplications",
            "Validate column duplication configuration",
            Severity::Warning,
            &["structure", "duplications", "columns"],
            validate_column_duplications,
        );
        engine.register_rule(
            "validate_source_columns",
            "Validate source columns format and references",
            Severity::Error,
            &["structure", "columns", "source"],
            validate_source_columns,
        );
        engine.register_rule(
            "validate_column_consistency",
            "Validate consistency across column sections",
            Severity::Warning,
            &["consistency", "columns"],
            validate_column_consistency,
        );
        engine.register_rule(
            "validate_job_settings",
            "Validate job-level settings section",
            Severity::Error,
            &["structure", "settings"],
            validate_job_settings,
        );

        Self {
            structural: StructuralValidator::with_registry(registry),
            engine,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn structural(&self) -> &StructuralValidator {
        &self.structural
    }

    /// Settings pass, column-section pass per mapping, then the structural
    /// layer. Each rule visits each node once.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        timed_scope("validate_comprehensive", |metrics| {
            let mut builder = ValidationResultBuilder::new();

            match document.get("settings") {
                None | Some(Value::Null) => {}
                Some(settings @ Value::Object(_)) => {
                    let ctx = ValidationContext::new("settings");
                    builder.absorb(self.engine.apply_rules(settings, &ctx, Some(SETTINGS_CATEGORIES)));
                }
                Some(_) => {
                    builder.add_error(
                        Diagnostic::error(
                            "invalid_settings_structure",
                            "settings section must be a dictionary",
                        )
                        .with_path("settings"),
                    );
                }
            }

            if let Some(all_mappings) = document.get("mappings").and_then(Value::as_array) {
                for (i, mapping) in all_mappings.iter().enumerate() {
                    if !mapping.is_object() {
                        continue;
                    }
                    let name = mapping_label(mapping, i);
                    debug!(component = "comprehensive_validator", mapping = %name, "Validating column sections");
                    let ctx = ValidationContext::new(format!("mappings[{i}]")).with_mapping(name);
                    builder.absorb(self.engine.apply_rules(mapping, &ctx, Some(COLUMN_CATEGORIES)));
                }
            }

            let structural = self.structural.validate(document);
            metrics.mappings_validated = metric_count(&structural, "mappings_validated") as usize;
            metrics.transformations_validated =
                metric_count(&structural, "transformations_validated") as usize;
            metrics.operations_validated = metric_count(&structural, "operations_validated") as usize;
            builder.absorb(structural);

            builder.build()
        })
    }
}

fn validate_default_partition_settings(
    settings: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(section) = settings.get("default_partition_settings") else {
        return Ok(RuleOutcome::NoFindings);
    };
    let Some(partition) = section.as_object() else {
        return Ok(Diagnostic::error(
            "invalid_partition_settings_type",
            format!(
                "default_partition_settings must be a dictionary, got {}",
                type_name(section)
            ),
        )
        .with_path(ctx.path_with("default_partition_settings"))
        .into());
    };

    let mut findings = Vec::new();

    for key in partition.keys() {
        if !PARTITION_SETTINGS.contains(&key.as_str()) {
            findings.push(
                Diagnostic::warning(
                    "unknown_partition_setting",
                    format!("Unknown partition setting: {key}"),
                )
                .with_path(ctx.path_with(&format!("default_partition_settings.{key}")))
                .with_extra("setting", key.as_str())
                .with_extra("valid_settings", PARTITION_SETTINGS.to_vec())
                .with_suggestion(format!("Remove unknown setting \"{key}\" or check for typos")),
            );
        }
    }

    if let Some(enabled) = partition.get("partition_enabled")
        && !matches!(enabled.as_str(), Some("Y" | "N"))
    {
        findings.push(
            Diagnostic::error(
                "invalid_partition_enabled_value",
                format!(
                    "partition_enabled must be Y/N or true/false, got: {}",
                    render(enabled)
                ),
            )
            .with_path(ctx.path_with("default_partition_settings.partition_enabled"))
            .with_extra("value", enabled.clone()),
        );
    }

    for (setting, min, max) in PARTITION_RANGES {
        let Some(value) = partition.get(setting) else {
            continue;
        };
        let in_range = value
            .as_f64()
            .is_some_and(|v| v >= min as f64 && v <= max as f64);
        if !in_range {
            findings.push(
                Diagnostic::error(
                    "invalid_numeric_setting",
                    format!(
                        "{setting} must be between {min} and {max}, got: {}",
                        render(value)
                    ),
                )
                .with_path(ctx.path_with(&format!("default_partition_settings.{setting}")))
                .with_extra("setting", setting)
                .with_extra("value", value.clone())
                .with_extra("min_value", min)
                .with_extra("max_value", max),
            );
        }
    }

    Ok(findings.into())
}

fn validate_job_settings(
    settings: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let mut findings = Vec::new();

    if let Some(load) = settings.get("load")
        && !load.as_str().is_some_and(|l| LOAD_MODES.contains(&l))
    {
        findings.push(
            Diagnostic::error(
                "invalid_load_mode",
                format!(
                    "Invalid load mode: {}. Must be one of: [{}]",
                    render(load),
                    LOAD_MODES.join(", ")
                ),
            )
            .with_path(ctx.path_with("load"))
            .with_extra("value", load.clone())
            .with_extra("valid_values", LOAD_MODES.to_vec()),
        );
    }

    if let Some(environment) = settings.get("environment")
        && !environment.as_str().is_some_and(|e| ENVIRONMENTS.contains(&e))
    {
        findings.push(
            Diagnostic::warning(
                "invalid_environment",
                format!(
                    "Invalid environment: {}. Must be one of: [{}]",
                    render(environment),
                    ENVIRONMENTS.join(", ")
                ),
            )
            .with_path(ctx.path_with("environment"))
            .with_extra("value", environment.clone())
            .with_extra("valid_values", ENVIRONMENTS.to_vec()),
        );
    }

    Ok(findings.into())
}

fn validate_column_mapping(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(section) = mapping.get("columns_mapping") else {
        return Ok(RuleOutcome::NoFindings);
    };
    let mapping_name = ctx.mapping_or_unknown();
    let path = ctx.path_with("columns_mapping");

    let Some(columns) = section.as_object() else {
        return Ok(Diagnostic::error(
            "invalid_column_mapping_type",
            format!("columns_mapping must be a dictionary in mapping: {mapping_name}"),
        )
        .with_path(path)
        .into());
    };

    let invalid = invalid_column_chars()?;
    let mut findings = Vec::new();

    for (source, target) in columns {
        if invalid.is_match(source) {
            findings.push(
                Diagnostic::warning(
                    "invalid_source_column_name",
                    format!("Source column name contains invalid characters: {source}"),
                )
                .with_path(path.as_str())
                .with_extra("column", source.as_str())
                .with_suggestion("Use only letters, numbers, and underscores in column names"),
            );
        }
        let target = render(target);
        if invalid.is_match(&target) {
            findings.push(
                Diagnostic::warning(
                    "invalid_target_column_name",
                    format!("Target column name contains invalid characters: {target}"),
                )
                .with_path(path.as_str())
                .with_extra("column", target)
                .with_suggestion("Use only letters, numbers, and underscores in column names"),
            );
        }
    }

    let targets: Vec<String> = columns.values().map(render).collect();
    let mut reported: Vec<&str> = Vec::new();
    for target in &targets {
        let repeated = targets.iter().filter(|t| *t == target).count() > 1;
        if repeated && !reported.contains(&target.as_str()) {
            reported.push(target);
            findings.push(
                Diagnostic::error(
                    "duplicate_target_column_mapping",
                    format!("Target column \"{target}\" is mapped from multiple source columns"),
                )
                .with_path(path.as_str())
                .with_extra("column", target.as_str())
                .with_suggestion("Ensure each target column has only one source mapping"),
            );
        }
    }

    Ok(findings.into())
}

fn validate_column_duplications(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(section) = mapping.get("column_duplications") else {
        return Ok(RuleOutcome::NoFindings);
    };
    let mapping_name = ctx.mapping_or_unknown();

    let Some(entries) = section.as_array() else {
        return Ok(Diagnostic::error(
            "invalid_column_duplications_type",
            format!("column_duplications must be a list in mapping: {mapping_name}"),
        )
        .with_path(ctx.path_with("column_duplications"))
        .into());
    };

    let mut findings = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let entry_path = ctx.path_with(&format!("column_duplications[{i}]"));
        let Some(fields) = entry.as_object() else {
            findings.push(
                Diagnostic::error(
                    "invalid_duplication_entry",
                    format!("Duplication entry must be a dictionary in mapping: {mapping_name}"),
                )
                .with_path(entry_path),
            );
            continue;
        };

        if !fields.contains_key("source_column") {
            findings.push(
                Diagnostic::error(
                    "missing_source_column",
                    "Missing source_column in duplication entry",
                )
                .with_path(entry_path.as_str()),
            );
        }

        match fields.get("additional_columns") {
            None => findings.push(
                Diagnostic::error(
                    "missing_additional_columns",
                    "Missing additional_columns in duplication entry",
                )
                .with_path(entry_path.as_str()),
            ),
            Some(Value::Array(columns)) if columns.is_empty() => findings.push(
                Diagnostic::warning(
                    "empty_additional_columns",
                    "additional_columns list cannot be empty",
                )
                .with_path(format!("{entry_path}.additional_columns"))
                .with_suggestion(
                    "Add at least one additional column or remove the duplication entry",
                ),
            ),
            Some(Value::Array(_)) => {}
            Some(_) => findings.push(
                Diagnostic::error(
                    "invalid_additional_columns_type",
                    "additional_columns must be a list",
                )
                .with_path(format!("{entry_path}.additional_columns")),
            ),
        }
    }

    Ok(findings.into())
}

fn validate_source_columns(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(section) = mapping.get("source_columns_interested") else {
        return Ok(RuleOutcome::NoFindings);
    };
    let mapping_name = ctx.mapping_or_unknown();

    let Some(entries) = section.as_array() else {
        return Ok(Diagnostic::error(
            "invalid_source_columns_type",
            format!("source_columns_interested must be a list in mapping: {mapping_name}"),
        )
        .with_path(ctx.path_with("source_columns_interested"))
        .into());
    };

    let mut findings = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let path = ctx.path_with(&format!("source_columns_interested[{i}]"));
        let Some(column) = entry.as_str() else {
            findings.push(
                Diagnostic::error(
                    "invalid_column_type",
                    format!("Source column must be a string, got: {}", type_name(entry)),
                )
                .with_path(path),
            );
            continue;
        };

        findings.extend(
            scan_expression(column)
                .into_iter()
                .map(|d| d.with_path(path.as_str())),
        );
        findings.extend(alias_format(column, &path)?);
    }

    Ok(findings.into())
}

/// Format checks on the alias part of one `source_columns_interested` entry.
fn alias_format(column: &str, path: &str) -> Result<Vec<Diagnostic>, RuleError> {
    let lower = normalize_whitespace(column).to_lowercase();
    let mut findings = Vec::new();

    if lower.contains(" as ") {
        let case_expression = lower.contains("case") && lower.contains("end as");
        let (parts, format_message, format_hint): (Vec<&str>, _, _) = if case_expression {
            (
                lower.split("end as ").collect(),
                format!("Invalid alias format in CASE expression: {column}"),
                "Use format: \"CASE ... END as alias_name\"",
            )
        } else {
            (
                lower.split(" as ").collect(),
                format!("Invalid alias format in column: {column}"),
                "Use format: \"column_expression as alias_name\"",
            )
        };

        let alias = match parts.as_slice() {
            [_, alias] if !(case_expression && alias.trim().is_empty()) => Some(alias.trim()),
            _ => None,
        };
        match alias {
            None => findings.push(
                Diagnostic::error("invalid_alias_format", format_message)
                    .with_path(path)
                    .with_extra("column", column)
                    .with_suggestion(format_hint),
            ),
            Some(alias) if !is_valid_identifier(alias)? => findings.push(
                Diagnostic::warning("invalid_alias_name", format!("Invalid alias name: {alias}"))
                    .with_path(path)
                    .with_extra("alias", alias)
                    .with_suggestion("Use valid identifier names for aliases"),
            ),
            Some(_) => {}
        }
    } else if let Some((alias, AliasShape::NonStandard)) = extract_alias_with_shape(column)? {
        findings.push(
            Diagnostic::warning(
                "non_standard_alias_format",
                format!("Non-standard alias format detected: {column}"),
            )
            .with_path(path)
            .with_extra("column", column)
            .with_suggestion(format!(
                "Consider using standard format with \"as\" keyword: \"column_expression as {alias}\""
            )),
        );
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mapping(extra: Value) -> Value {
        let mut base = json!({
            "mapping_name": "orders",
            "source_table": "src.orders",
            "target_table": "dst.orders",
            "source_columns_interested": ["id as rid", "amount"],
            "column_transformations": [{
                "source_alias": "rid",
                "target_column": "record_id",
                "data_type": "BIGINT",
                "transformation_type": "direct_mapping"
            }]
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        base
    }

    fn validate(document: Value) -> ValidationResult {
        ComprehensiveValidator::new().validate(&document)
    }

    #[test]
    fn test_clean_document() {
        let result = validate(json!({
            "settings": {
                "load": "full",
                "environment": "prod",
                "default_partition_settings": {"partition_enabled": "Y", "num_partitions": 8}
            },
            "mappings": [mapping(json!({"columns_mapping": {"rid": "record_id"}}))]
        }));
        assert!(result.is_valid(), "{:?}", result.errors());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_partition_settings() {
        let result = validate(json!({
            "settings": {
                "default_partition_settings": {
                    "partition_enabled": "yes",
                    "partition_buffer_percent": 150,
                    "num_partitions": "many",
                    "partition_size": 3
                }
            },
            "mappings": []
        }));

        assert_eq!(result.warning_types(), vec!["unknown_partition_setting"]);
        assert_eq!(
            result.warnings()[0].path(),
            Some("settings.default_partition_settings.partition_size")
        );
        assert_eq!(
            result.error_types(),
            vec!["invalid_partition_enabled_value", "invalid_numeric_setting"]
        );
        let numeric = result.errors_by_type("invalid_numeric_setting");
        assert_eq!(numeric.len(), 2);
        assert_eq!(
            numeric[0].message(),
            "partition_buffer_percent must be between 0 and 100, got: 150"
        );
    }

    #[test]
    fn test_job_settings() {
        let result = validate(json!({
            "settings": {"load": "weekly", "environment": "qa"},
            "mappings": []
        }));
        assert_eq!(result.error_types(), vec!["invalid_load_mode"]);
        assert_eq!(
            result.errors()[0].message(),
            "Invalid load mode: weekly. Must be one of: [full, delta, incremental]"
        );
        assert_eq!(result.errors()[0].path(), Some("settings.load"));
        assert_eq!(result.warning_types(), vec!["invalid_environment"]);
    }

    #[test]
    fn test_settings_must_be_a_map() {
        let result = validate(json!({"settings": ["load"], "mappings": []}));
        assert_eq!(result.error_types(), vec!["invalid_settings_structure"]);
    }

    #[test]
    fn test_columns_mapping() {
        let result = validate(json!({
            "mappings": [mapping(json!({
                "source_columns_interested": ["id as rid", "amount", "total"],
                "columns_mapping": {"rid": "out_id", "amount": "out_id", "total": "out total"}
            }))]
        }));

        assert_eq!(result.warning_types(), vec!["invalid_target_column_name"]);
        let duplicates = result.errors_by_type("duplicate_target_column_mapping");
        assert_eq!(duplicates.len(), 1);
        assert_eq!(
            duplicates[0].message(),
            "Target column \"out_id\" is mapped from multiple source columns"
        );
        assert_eq!(duplicates[0].mapping_name(), Some("orders"));
    }

    #[test]
    fn test_column_duplications() {
        let result = validate(json!({
            "mappings": [mapping(json!({
                "column_duplications": [
                    "rid",
                    {"additional_columns": ["copy"]},
                    {"source_column": "rid"},
                    {"source_column": "rid", "additional_columns": "copy"},
                    {"source_column": "rid", "additional_columns": []}
                ]
            }))]
        }));

        assert_eq!(
            result.error_types(),
            vec![
                "invalid_duplication_entry",
                "missing_source_column",
                "missing_additional_columns",
                "invalid_additional_columns_type",
            ]
        );
        assert_eq!(result.warning_types(), vec!["empty_additional_columns"]);
        assert_eq!(
            result.warnings()[0].path(),
            Some("mappings[0].column_duplications[4].additional_columns")
        );
    }

    #[test]
    fn test_source_column_alias_formats() {
        let result = validate(json!({
            "mappings": [mapping(json!({
                "source_columns_interested": [
                    "id as rid",
                    "amount",
                    7,
                    "a as b as c",
                    "price as 9lives",
                    "\"Customer Name\" customer_name"
                ]
            }))]
        }));

        assert_eq!(
            result.error_types(),
            vec!["invalid_column_type", "invalid_alias_format"]
        );
        assert_eq!(
            result.errors()[0].message(),
            "Source column must be a string, got: integer"
        );
        assert_eq!(
            result.warning_types(),
            vec!["invalid_alias_name", "non_standard_alias_format"]
        );
        assert_eq!(
            result.warnings()[1].path(),
            Some("mappings[0].source_columns_interested[5]")
        );
    }

    #[test]
    fn test_source_column_injection() {
        let result = validate(json!({
            "mappings": [mapping(json!({
                "source_columns_interested": ["id as rid", "id; DROP TABLE users; --"]
            }))]
        }));

        let critical = result.critical_errors();
        assert!(!critical.is_empty());
        assert!(critical.iter().all(|d| d.path() == Some("mappings[0].source_columns_interested[1]")));
        assert!(critical.iter().any(|d| d.message().contains("drop")));
    }

    #[test]
    fn test_structural_layer_runs_once() {
        let result = validate(json!({
            "mappings": [mapping(json!({
                "column_transformations": [{"source_alias": "rid", "target_column": "x"}]
            }))]
        }));
        assert_eq!(result.errors_by_type("missing_required_field").len(), 2);
        assert_eq!(result.messages_by_type("validation_summary").len(), 1);
    }
}
