//! Base validator for mappings and their column transformations.
//!
//! Checks mapping names, the required fields of each column
//! transformation, transformation types, data type spelling, operation
//! steps (through the [`OperationRegistry`]) and duplicate target columns.
//! A document-level pass adds quality heuristics for long or redundant
//! operation chains; those only ever produce warnings and info.

use crate::{OperationRegistry, RuleEngine, RuleError, RuleOutcome, timed_scope};
use mapping_core::document::{list_field, mapping_label, mappings, render, str_field, type_name};
use mapping_core::{
    Diagnostic, Severity, ValidationContext, ValidationResult, ValidationResultBuilder,
};
use regex::Regex;
use serde_json::{Map, Value, json};
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Allowed values of `transformation_type`.
pub const TRANSFORMATION_TYPES: [&str; 12] = [
    "direct_mapping",
    "string_manipulation",
    "date_formatting",
    "value_mapping",
    "data_type_conversion",
    "conditional",
    "expression",
    "complex",
    "type_conversion",
    "numeric_transformation",
    "financial_calculation",
    "mathematical_operation",
];

/// Transformation fields that must always be present.
pub const REQUIRED_TRANSFORMATION_FIELDS: [&str; 4] =
    ["source_alias", "target_column", "data_type", "transformation_type"];

const ROUNDING_OPERATIONS: [&str; 4] = ["round", "ceil", "floor", "truncate_number"];
const ARITHMETIC_OPERATIONS: [&str; 4] = ["multiply", "divide", "add", "subtract"];
const MAX_CHAIN_LENGTH: usize = 5;
const MAX_ARITHMETIC_STEPS: usize = 3;

pub(crate) const MAPPING_CATEGORIES: &[&str] =
    &["structure", "mapping", "transformation", "operation", "quality"];
pub(crate) const GLOBAL_CATEGORIES: &[&str] = &["performance", "numeric"];

struct StructuralPatterns {
    mapping_name: Regex,
    data_type: Regex,
}

static PATTERNS: LazyLock<Result<StructuralPatterns, regex::Error>> = LazyLock::new(|| {
    Ok(StructuralPatterns {
        mapping_name: Regex::new(r"^[a-zA-Z0-9_-]+$")?,
        data_type: Regex::new(
            r"(?i)^(VARCHAR|CHAR|TEXT|STRING|INTEGER|INT|BIGINT|DECIMAL|NUMERIC|FLOAT|DOUBLE|BOOLEAN|BOOL|DATE|TIMESTAMP|DATETIME|TIME|BINARY|VARBINARY|ARRAY|MAP|STRUCT)\s*(?:\([^)]*\))?\s*$",
        )?,
    })
});

fn patterns() -> Result<&'static StructuralPatterns, RuleError> {
    PATTERNS
        .as_ref()
        .map_err(|e| RuleError::pattern("structural patterns", e.to_string()))
}

/// Validates the column transformations of every mapping.
///
/// # Example
///
/// ```rust
/// use mapping_validator::StructuralValidator;
/// use serde_json::json;
///
/// let document = json!({
///     "mappings": [{
///         "mapping_name": "orders",
///         "column_transformations": [{
///             "source_alias": "amount",
///             "target_column": "amount_usd",
///             "data_type": "DECIMAL(10,2)",
///             "transformation_type": "numeric_transformation",
///             "transformations": [{"type": "round", "parameters": {"precision": 2}}]
///         }]
///     }]
/// });
///
/// let result = StructuralValidator::new().validate(&document);
/// assert!(result.is_valid());
/// ```
pub struct StructuralValidator {
    engine: RuleEngine,
    registry: Arc<OperationRegistry>,
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralValidator {
    /// Creates a validator backed by the shared operation registry.
    pub fn new() -> Self {
        Self::with_registry(OperationRegistry::shared())
    }

    /// Creates a validator backed by a custom operation registry.
    pub fn with_registry(registry: Arc<OperationRegistry>) -> Self {
        let mut engine = RuleEngine::new();

        engine.register_rule(
            "validate_mapping_structure",
            "Validate basic mapping structure and naming",
            Severity::Error,
            &["structure", "mapping"],
            validate_mapping_structure,
        );

        let ops = Arc::clone(&registry);
        engine.register_rule(
            "validate_transformation_structure",
            "Validate transformation structure and required fields",
            Severity::Error,
            &["structure", "transformation"],
            move |mapping, ctx| validate_transformation_structure(&ops, mapping, ctx),
        );

        engine.register_rule(
            "check_duplicate_targets",
            "Check for duplicate target column names",
            Severity::Error,
            &["quality", "duplicates"],
            check_duplicate_targets,
        );

        engine.register_rule(
            "check_complex_chains",
            "Check for overly complex transformation chains",
            Severity::Warning,
            &["performance", "complexity"],
            check_complex_chains,
        );

        engine.register_rule(
            "validate_numeric_operations",
            "Validate numeric operation chains and compatibility",
            Severity::Warning,
            &["numeric", "operations"],
            validate_numeric_operations,
        );

        Self { engine, registry }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Runs the per-mapping and document-level passes.
    ///
    /// Ends with a `validation_summary` info and carries performance metrics.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        timed_scope("validate_column_transformations", |metrics| {
            let mut builder = ValidationResultBuilder::new();

            let Some(section) = document.get("mappings") else {
                builder.add_error(
                    Diagnostic::error("missing_section", "No mappings section found in YAML")
                        .with_path("root"),
                );
                return builder.build();
            };
            let Some(all_mappings) = section.as_array() else {
                builder.add_error(
                    Diagnostic::error(
                        "invalid_mappings_structure",
                        "mappings section must be a list",
                    )
                    .with_path("mappings"),
                );
                return builder.build();
            };

            let mut total_transformations = 0;
            for (i, mapping) in all_mappings.iter().enumerate() {
                let transformations = list_field(mapping, "column_transformations");
                total_transformations += transformations.len();

                if !mapping.is_object() {
                    builder.add_error(
                        Diagnostic::error("invalid_mapping_type", "Mapping must be a dictionary")
                            .with_path(format!("mappings[{i}]")),
                    );
                    continue;
                }

                let name = mapping_label(mapping, i);
                debug!(component = "structural_validator", mapping = %name, "Validating mapping");

                let ctx = ValidationContext::new(format!("mappings[{i}]")).with_mapping(name);
                builder.absorb(self.engine.apply_rules(mapping, &ctx, Some(MAPPING_CATEGORIES)));

                metrics.mappings_validated += 1;
                metrics.transformations_validated += transformations.len();
                metrics.operations_validated += transformations
                    .iter()
                    .map(|t| list_field(t, "transformations").len())
                    .sum::<usize>();
            }

            builder.absorb(self.engine.apply_rules(
                document,
                &ValidationContext::root(),
                Some(GLOBAL_CATEGORIES),
            ));

            builder.add_info(
                Diagnostic::info(
                    "validation_summary",
                    format!(
                        "Validation completed. Total mappings: {}, Total transformations: {total_transformations}",
                        all_mappings.len()
                    ),
                )
                .with_path("root"),
            );

            metrics.record("rules_registered", self.engine.rules().len());
            builder.build()
        })
    }
}

fn validate_mapping_structure(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(name) = mapping.get("mapping_name") else {
        return Ok(RuleOutcome::NoFindings);
    };

    let valid = match name.as_str() {
        Some(name) => patterns()?.mapping_name.is_match(name),
        None => false,
    };
    if valid {
        return Ok(RuleOutcome::NoFindings);
    }

    Ok(Diagnostic::error(
        "invalid_mapping_name",
        format!("Invalid mapping_name pattern: {}", render(name)),
    )
    .with_path(ctx.path_with("mapping_name"))
    .with_suggestion("Use only letters, numbers, underscores, and hyphens")
    .into())
}

fn validate_transformation_structure(
    registry: &OperationRegistry,
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(section) = mapping.get("column_transformations") else {
        return Ok(RuleOutcome::NoFindings);
    };
    let mapping_name = ctx.mapping_or_unknown();

    let Some(transformations) = section.as_array() else {
        return Ok(Diagnostic::error(
            "invalid_transformations_type",
            format!("column_transformations must be a list in mapping: {mapping_name}"),
        )
        .with_path(ctx.path_with("column_transformations"))
        .into());
    };

    let mut findings = Vec::new();
    for (i, transformation) in transformations.iter().enumerate() {
        let child = ctx.with_transformation(i);
        findings.extend(check_transformation(registry, transformation, &child)?);
    }
    Ok(findings.into())
}

/// Checks one column transformation; `ctx` points at it.
pub(crate) fn check_transformation(
    registry: &OperationRegistry,
    transformation: &Value,
    ctx: &ValidationContext,
) -> Result<Vec<Diagnostic>, RuleError> {
    let Some(fields) = transformation.as_object() else {
        return Ok(vec![
            Diagnostic::error(
                "invalid_transformation_type",
                "Transformation must be a dictionary",
            )
            .with_path(ctx.path()),
        ]);
    };

    let mut findings: Vec<Diagnostic> = REQUIRED_TRANSFORMATION_FIELDS
        .iter()
        .filter(|field| !fields.contains_key(**field))
        .map(|field| {
            Diagnostic::error(
                "missing_required_field",
                format!("Missing required field \"{field}\" in transformation"),
            )
            .with_path(ctx.path())
            .with_extra("field", *field)
            .with_suggestion(format!(
                "Add the required \"{field}\" field to the transformation"
            ))
        })
        .collect();

    if let Some(kind) = fields.get("transformation_type") {
        let known = kind
            .as_str()
            .is_some_and(|k| TRANSFORMATION_TYPES.contains(&k));
        if !known {
            findings.push(
                Diagnostic::error(
                    "invalid_transformation_type",
                    format!("Invalid transformation_type \"{}\"", render(kind)),
                )
                .with_path(ctx.path())
                .with_extra("invalid_value", kind.clone())
                .with_extra("valid_values", TRANSFORMATION_TYPES.to_vec())
                .with_suggestion(format!(
                    "Use one of the valid transformation types: {}...",
                    TRANSFORMATION_TYPES[..5].join(", ")
                )),
            );
        }
    }

    if let Some(data_type) = fields.get("data_type") {
        let matches = match data_type.as_str() {
            Some(text) => patterns()?.data_type.is_match(text),
            None => false,
        };
        if !matches {
            findings.push(
                Diagnostic::warning(
                    "invalid_data_type_pattern",
                    format!("Potentially invalid data_type pattern: \"{}\"", render(data_type)),
                )
                .with_path(ctx.path())
                .with_extra("data_type", data_type.clone())
                .with_suggestion(
                    "Ensure data type follows standard SQL patterns like VARCHAR(50), DECIMAL(10,2), etc.",
                ),
            );
        }
    }

    let kind = str_field(transformation, "transformation_type").filter(|k| !k.is_empty());
    if let Some(kind) = kind
        && kind != "direct_mapping"
    {
        match fields.get("transformations") {
            None => findings.push(
                Diagnostic::error(
                    "missing_transformations_array",
                    "Non-direct mappings require \"transformations\" array",
                )
                .with_path(ctx.path())
                .with_extra("transformation_type", kind)
                .with_suggestion("Add a \"transformations\" array with the required operations"),
            ),
            Some(operations) => findings.extend(check_operations(registry, operations, ctx)),
        }
    }

    Ok(findings)
}

fn check_operations(
    registry: &OperationRegistry,
    operations: &Value,
    ctx: &ValidationContext,
) -> Vec<Diagnostic> {
    let Some(steps) = operations.as_array() else {
        return vec![
            Diagnostic::error("invalid_operations_type", "Transformations must be a list")
                .with_path(ctx.path_with("transformations")),
        ];
    };

    if steps.is_empty() {
        return vec![
            Diagnostic::warning("empty_transformations", "Empty transformations array")
                .with_path(ctx.path_with("transformations"))
                .with_suggestion("Remove empty transformations array or add required operations"),
        ];
    }

    steps
        .iter()
        .enumerate()
        .flat_map(|(j, step)| check_operation(registry, step, &ctx.with_operation(j)))
        .collect()
}

fn check_operation(
    registry: &OperationRegistry,
    step: &Value,
    ctx: &ValidationContext,
) -> Vec<Diagnostic> {
    let Some(fields) = step.as_object() else {
        return vec![
            Diagnostic::error("invalid_operation_type", "Operation must be a dictionary")
                .with_path(ctx.path()),
        ];
    };

    let Some(kind) = fields.get("type") else {
        return vec![
            Diagnostic::error(
                "missing_operation_type",
                "Operation missing required \"type\" field",
            )
            .with_path(ctx.path())
            .with_suggestion("Add a \"type\" field specifying the operation type"),
        ];
    };

    let empty = Map::new();
    let parameters = match fields.get("parameters") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(parameters)) => parameters,
        Some(other) => {
            return vec![
                Diagnostic::error(
                    "invalid_parameters_type",
                    format!(
                        "Operation parameters must be a dictionary, got {}",
                        type_name(other)
                    ),
                )
                .with_path(ctx.path_with("parameters")),
            ];
        }
    };

    let name = render(kind);
    let mut diagnostics = registry.validate_operation(&name, parameters, &ctx.path());
    if let Some(mapping) = ctx.mapping_name.as_deref() {
        diagnostics = diagnostics
            .into_iter()
            .map(|d| d.with_mapping(mapping))
            .collect();
    }

    diagnostics
        .into_iter()
        .map(|d| {
            if d.kind() != "invalid_operation_type" || d.suggestion().is_some() {
                return d;
            }
            let candidates = registry.suggestions(&name, 5);
            if candidates.is_empty() {
                d
            } else {
                let shown: Vec<&str> = candidates.into_iter().take(3).collect();
                d.with_suggestion(format!("Did you mean one of: {}?", shown.join(", ")))
            }
        })
        .collect()
}

fn check_duplicate_targets(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let mapping_name = ctx.mapping_or_unknown();
    let mut seen: Vec<&Value> = Vec::new();
    let mut findings = Vec::new();

    for (i, transformation) in list_field(mapping, "column_transformations").iter().enumerate() {
        let Some(target) = transformation.get("target_column").filter(|t| is_truthy(t)) else {
            continue;
        };
        if seen.contains(&target) {
            findings.push(
                Diagnostic::error(
                    "duplicate_target_column",
                    format!(
                        "Duplicate target column \"{}\" found in mapping \"{mapping_name}\"",
                        render(target)
                    ),
                )
                .with_path(format!("{}.column_transformations[{i}]", ctx.path()))
                .with_extra("column", target.clone())
                .with_suggestion(format!(
                    "Rename one of the duplicate \"{}\" target columns",
                    render(target)
                )),
            );
        } else {
            seen.push(target);
        }
    }

    Ok(findings.into())
}

fn check_complex_chains(document: &Value, _: &ValidationContext) -> Result<RuleOutcome, RuleError> {
    let mut findings = Vec::new();

    for (i, mapping) in mappings(document).iter().enumerate() {
        let name = mapping_label(mapping, i);
        for (j, transformation) in list_field(mapping, "column_transformations").iter().enumerate() {
            let count = list_field(transformation, "transformations").len();
            if count > MAX_CHAIN_LENGTH {
                findings.push(
                    Diagnostic::warning(
                        "complex_transformation_chain",
                        format!("Complex transformation chain with {count} operations"),
                    )
                    .with_path(format!("mappings[{i}].column_transformations[{j}]"))
                    .with_mapping(name.as_str())
                    .with_extra("operation_count", count)
                    .with_suggestion(
                        "Consider using sql_expression for complex calculations or breaking into multiple transformations",
                    ),
                );
            }
        }
    }

    Ok(findings.into())
}

fn validate_numeric_operations(
    document: &Value,
    _: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let mut findings = Vec::new();

    for (i, mapping) in mappings(document).iter().enumerate() {
        let name = mapping_label(mapping, i);
        for (j, transformation) in list_field(mapping, "column_transformations").iter().enumerate() {
            let steps = list_field(transformation, "transformations");
            if steps.len() <= 1 {
                continue;
            }
            let path = format!("mappings[{i}].column_transformations[{j}]");
            let kinds: Vec<&str> = steps.iter().filter_map(|s| str_field(s, "type")).collect();

            let rounding: Vec<&str> = kinds
                .iter()
                .copied()
                .filter(|k| ROUNDING_OPERATIONS.contains(k))
                .collect();
            if rounding.len() > 1 {
                findings.push(
                    Diagnostic::warning(
                        "redundant_rounding",
                        format!("Multiple rounding operations detected: [{}]", rounding.join(", ")),
                    )
                    .with_path(path.as_str())
                    .with_mapping(name.as_str())
                    .with_extra("rounding_operations", rounding.clone())
                    .with_suggestion(
                        "Consider combining rounding operations - only the last one will take effect",
                    ),
                );
            }

            let arithmetic: Vec<&str> = kinds
                .iter()
                .copied()
                .filter(|k| ARITHMETIC_OPERATIONS.contains(k))
                .collect();
            if arithmetic.len() > MAX_ARITHMETIC_STEPS {
                findings.push(
                    Diagnostic::info(
                        "complex_arithmetic_chain",
                        format!("Complex arithmetic chain with {} operations", arithmetic.len()),
                    )
                    .with_path(path.as_str())
                    .with_mapping(name.as_str())
                    .with_extra("arithmetic_operations", arithmetic.clone())
                    .with_suggestion("Consider using sql_expression for complex calculations"),
                );
            }

            for (k, pair) in steps.windows(2).enumerate() {
                if str_field(&pair[0], "type") != Some("divide")
                    || str_field(&pair[1], "type") != Some("multiply")
                {
                    continue;
                }
                let (divisor, factor) = (factor_of(&pair[0]), factor_of(&pair[1]));
                let (Some(a), Some(b)) = (divisor.as_f64(), factor.as_f64()) else {
                    continue;
                };
                if (a * b - 1.0).abs() < 1e-4 {
                    findings.push(
                        Diagnostic::warning(
                            "canceling_operations",
                            format!(
                                "Division by {} followed by multiplication by {} largely cancel out",
                                render(&divisor),
                                render(&factor)
                            ),
                        )
                        .with_path(format!("{path}.transformations[{k}]"))
                        .with_mapping(name.as_str())
                        .with_suggestion("Consider simplifying or removing these operations"),
                    );
                }
            }
        }
    }

    Ok(findings.into())
}

/// The `factor` parameter of a step, `1` when absent.
fn factor_of(step: &Value) -> Value {
    step.get("parameters")
        .and_then(|p| p.get("factor"))
        .cloned()
        .unwrap_or_else(|| json!(1))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transformation(kind: &str, steps: Value) -> Value {
        json!({
            "source_alias": "amount",
            "target_column": "amount_out",
            "data_type": "DECIMAL(10,2)",
            "transformation_type": kind,
            "transformations": steps
        })
    }

    fn document(transformations: Value) -> Value {
        json!({
            "mappings": [{
                "mapping_name": "orders",
                "column_transformations": transformations
            }]
        })
    }

    #[test]
    fn test_missing_mappings_section() {
        let result = StructuralValidator::new().validate(&json!({"settings": {}}));
        assert_eq!(result.error_types(), vec!["missing_section"]);
        assert_eq!(result.errors()[0].path(), Some("root"));
    }

    #[test]
    fn test_mappings_must_be_a_list() {
        let result = StructuralValidator::new().validate(&json!({"mappings": {"a": 1}}));
        assert_eq!(result.error_types(), vec!["invalid_mappings_structure"]);
    }

    #[test]
    fn test_non_object_mapping() {
        let result = StructuralValidator::new().validate(&json!({"mappings": ["oops"]}));
        assert_eq!(result.error_types(), vec!["invalid_mapping_type"]);
        assert_eq!(result.errors()[0].path(), Some("mappings[0]"));
    }

    #[test]
    fn test_missing_required_field() {
        let doc = document(json!([{
            "source_alias": "id",
            "target_column": "id",
            "transformation_type": "direct_mapping"
        }]));
        let result = StructuralValidator::new().validate(&doc);

        let missing = result.errors_by_type("missing_required_field");
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].field(), Some("data_type"));
        assert_eq!(missing[0].path(), Some("mappings[0].column_transformations[0]"));
        assert_eq!(missing[0].mapping_name(), Some("orders"));
    }

    #[test]
    fn test_invalid_mapping_name() {
        let doc = json!({"mappings": [{"mapping_name": "orders daily"}]});
        let result = StructuralValidator::new().validate(&doc);
        assert_eq!(result.error_types(), vec!["invalid_mapping_name"]);
        assert_eq!(result.errors()[0].path(), Some("mappings[0].mapping_name"));
    }

    #[test]
    fn test_transformation_type_and_data_type() {
        let doc = document(json!([{
            "source_alias": "id",
            "target_column": "id",
            "data_type": "VARCHAR2(10)",
            "transformation_type": "teleport",
            "transformations": [{"type": "trim"}]
        }]));
        let result = StructuralValidator::new().validate(&doc);

        assert_eq!(result.error_types(), vec!["invalid_transformation_type"]);
        assert_eq!(
            result.errors()[0].suggestion(),
            Some("Use one of the valid transformation types: direct_mapping, string_manipulation, date_formatting, value_mapping, data_type_conversion...")
        );
        assert_eq!(result.warning_types(), vec!["invalid_data_type_pattern"]);
    }

    #[test]
    fn test_data_type_pattern_is_case_insensitive() {
        let doc = document(json!([{
            "source_alias": "id",
            "target_column": "id",
            "data_type": "varchar(50)",
            "transformation_type": "direct_mapping"
        }]));
        let result = StructuralValidator::new().validate(&doc);
        assert!(result.warnings().is_empty());
        assert!(result.is_valid());
    }

    #[test]
    fn test_operation_checks() {
        let doc = document(json!([
            {
                "source_alias": "a",
                "target_column": "a",
                "data_type": "DECIMAL",
                "transformation_type": "numeric_transformation"
            },
            transformation("numeric_transformation", json!([])),
            transformation("numeric_transformation", json!("round")),
            transformation("numeric_transformation", json!([
                "round",
                {"parameters": {}},
                {"type": "rnd"},
                {"type": "divide", "parameters": {"factor": 0}},
                {"type": "trim", "parameters": ["x"]}
            ]))
        ]));
        let result = StructuralValidator::new().validate(&doc);

        assert_eq!(
            result.error_types(),
            vec![
                "missing_transformations_array",
                "invalid_operations_type",
                "invalid_operation_type",
                "missing_operation_type",
                "division_by_zero",
                "invalid_parameters_type",
                "duplicate_target_column",
            ]
        );
        assert_eq!(result.warning_types(), vec!["empty_transformations"]);

        let unknown = result.errors_by_type("invalid_operation_type");
        assert_eq!(unknown[0].message(), "Operation must be a dictionary");
        assert_eq!(unknown[1].message(), "Invalid operation type \"rnd\"");
        assert_eq!(unknown[1].suggestion(), None);
        assert_eq!(
            unknown[1].path(),
            Some("mappings[0].column_transformations[3].transformations[2]")
        );
        assert_eq!(unknown[1].mapping_name(), Some("orders"));
    }

    #[test]
    fn test_unknown_operation_suggestion() {
        let doc = document(json!([transformation(
            "string_manipulation",
            json!([{"type": "trim_all"}])
        )]));
        let result = StructuralValidator::new().validate(&doc);
        let unknown = result.errors_by_type("invalid_operation_type");
        assert_eq!(unknown[0].suggestion(), None);

        let doc = document(json!([transformation(
            "string_manipulation",
            json!([{"type": "parse"}])
        )]));
        let result = StructuralValidator::new().validate(&doc);
        let unknown = result.errors_by_type("invalid_operation_type");
        assert_eq!(
            unknown[0].suggestion(),
            Some("Did you mean one of: parse_currency, parse_number?")
        );
    }

    #[test]
    fn test_duplicate_targets() {
        let doc = document(json!([
            transformation("direct_mapping", json!([])),
            transformation("direct_mapping", json!([])),
            transformation("direct_mapping", json!([]))
        ]));
        let result = StructuralValidator::new().validate(&doc);

        let duplicates = result.errors_by_type("duplicate_target_column");
        assert_eq!(duplicates.len(), 2);
        assert_eq!(
            duplicates[0].message(),
            "Duplicate target column \"amount_out\" found in mapping \"orders\""
        );
        assert_eq!(duplicates[0].path(), Some("mappings[0].column_transformations[1]"));
    }

    #[test]
    fn test_chain_heuristics() {
        let steps = json!([
            {"type": "round", "parameters": {"precision": 2}},
            {"type": "divide", "parameters": {"factor": 4}},
            {"type": "multiply", "parameters": {"factor": 0.25}},
            {"type": "add", "parameters": {"value": 1}},
            {"type": "subtract", "parameters": {"value": 1}},
            {"type": "floor"}
        ]);
        let doc = document(json!([transformation("numeric_transformation", steps)]));
        let result = StructuralValidator::new().validate(&doc);

        assert!(result.is_valid());
        assert_eq!(
            result.warning_types(),
            vec!["complex_transformation_chain", "redundant_rounding", "canceling_operations"]
        );
        assert_eq!(
            result.warnings_by_type("redundant_rounding")[0].message(),
            "Multiple rounding operations detected: [round, floor]"
        );
        assert_eq!(
            result.warnings_by_type("canceling_operations")[0].path(),
            Some("mappings[0].column_transformations[0].transformations[1]")
        );
        assert_eq!(result.messages_by_type("complex_arithmetic_chain").len(), 1);
    }

    #[test]
    fn test_summary_and_metrics() {
        let doc = document(json!([
            transformation("string_manipulation", json!([{"type": "trim"}, {"type": "uppercase"}]))
        ]));
        let result = StructuralValidator::new().validate(&doc);

        let summary = result.messages_by_type("validation_summary");
        assert_eq!(
            summary[0].message(),
            "Validation completed. Total mappings: 1, Total transformations: 1"
        );

        let metrics = result.performance_metrics().unwrap();
        assert_eq!(metrics["mappings_validated"], json!(1));
        assert_eq!(metrics["transformations_validated"], json!(1));
        assert_eq!(metrics["operations_validated"], json!(2));
    }
}
