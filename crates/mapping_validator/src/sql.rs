//! SQL expression checks on `source_columns_interested`.

use crate::{
    ComprehensiveValidator, DeclaredColumns, ExpressionType, OperationRegistry, RuleEngine,
    RuleError, RuleOutcome, extract_alias, is_valid_identifier, looks_like_sql_expression,
    quoted_identifiers, scope::metric_count, timed_scope,
};
use mapping_core::document::{list_field, mapping_label, mappings};
use mapping_core::{
    Diagnostic, Severity, ValidationContext, ValidationResult, ValidationResultBuilder,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub(crate) const SQL_CATEGORIES: &[&str] = &["sql"];

const SHOWN_ALIASES: usize = 5;

/// [`ComprehensiveValidator`] plus SQL expression alias, quoting and
/// reference checks.
pub struct SqlExpressionValidator {
    comprehensive: ComprehensiveValidator,
    engine: RuleEngine,
}

impl Default for SqlExpressionValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlExpressionValidator {
    pub fn new() -> Self {
        Self::with_registry(OperationRegistry::shared())
    }

    pub fn with_registry(registry: Arc<OperationRegistry>) -> Self {
        let mut engine = RuleEngine::new();
        engine.register_rule(
            "validate_sql_expression_aliases",
            "Validate SQL expressions have proper aliases and are used correctly in mapping",
            Severity::Error,
            &["sql", "expression", "mapping", "alias"],
            validate_sql_expression_aliases,
        );
        engine.register_rule(
            "validate_column_mapping_sql_consistency",
            "Validate column_mapping references match source_columns_interested including SQL expressions",
            Severity::Error,
            &["sql", "mapping", "consistency"],
            validate_column_mapping_sql_consistency,
        );
        engine.register_rule(
            "validate_quoted_identifiers",
            "Validate proper handling of quoted identifiers in SQL expressions",
            Severity::Warning,
            &["sql", "identifier", "quote"],
            validate_quoted_identifiers,
        );
        engine.register_rule(
            "validate_complex_sql_expressions",
            "Validate complex SQL expressions (CASE, functions, math) are properly aliased",
            Severity::Error,
            &["sql", "expression", "complex"],
            validate_complex_sql_expressions,
        );

        Self {
            comprehensive: ComprehensiveValidator::with_registry(registry),
            engine,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn comprehensive(&self) -> &ComprehensiveValidator {
        &self.comprehensive
    }

    /// Comprehensive validation followed by the SQL pass and a trailing
    /// `sql_expression_summary` info.
    pub fn validate(&self, document: &Value) -> ValidationResult {
        timed_scope("validate_sql_expression_mapping", |metrics| {
            let base = self.comprehensive.validate(document);
            metrics.mappings_validated = metric_count(&base, "mappings_validated") as usize;
            metrics.transformations_validated =
                metric_count(&base, "transformations_validated") as usize;
            metrics.operations_validated = metric_count(&base, "operations_validated") as usize;

            let mut builder = ValidationResultBuilder::new();
            builder.absorb(base);

            let Some(all_mappings) = document.get("mappings").and_then(Value::as_array) else {
                return builder.build();
            };

            for (i, mapping) in all_mappings.iter().enumerate() {
                if !mapping.is_object() {
                    continue;
                }
                let name = mapping_label(mapping, i);
                debug!(component = "sql_expression_validator", mapping = %name, "Checking SQL expressions");
                let ctx = ValidationContext::new(format!("mappings[{i}]")).with_mapping(name);
                builder.absorb(self.engine.apply_rules(mapping, &ctx, Some(SQL_CATEGORIES)));
            }

            let (expressions, with_sql) = count_sql_expressions(document);
            metrics.record("sql_expressions", expressions);
            builder.add_info(
                Diagnostic::info(
                    "sql_expression_summary",
                    format!(
                        "SQL Expression Analysis: {expressions} expressions found across {with_sql} mappings"
                    ),
                )
                .with_path("root"),
            );

            builder.build()
        })
    }
}

/// Aliased entries across the document and the number of mappings holding
/// at least one.
pub fn count_sql_expressions(document: &Value) -> (usize, usize) {
    let mut expressions = 0;
    let mut with_sql = 0;
    for mapping in mappings(document) {
        let aliased = list_field(mapping, "source_columns_interested")
            .iter()
            .filter_map(Value::as_str)
            .filter(|entry| matches!(extract_alias(entry), Ok(Some(_))))
            .count();
        expressions += aliased;
        if aliased > 0 {
            with_sql += 1;
        }
    }
    (expressions, with_sql)
}

/// String entries of `source_columns_interested` with their index; `None`
/// when the section is absent.
fn source_entries(mapping: &Value) -> Option<impl Iterator<Item = (usize, &str)>> {
    mapping.get("source_columns_interested")?;
    Some(
        list_field(mapping, "source_columns_interested")
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_str().map(|text| (i, text))),
    )
}

fn validate_sql_expression_aliases(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(entries) = source_entries(mapping) else {
        return Ok(RuleOutcome::NoFindings);
    };

    let mut findings = Vec::new();
    for (i, expression) in entries {
        let path = ctx.path_with(&format!("source_columns_interested[{i}]"));
        match extract_alias(expression)? {
            Some(alias) => {
                if expression.matches('"').count() % 2 != 0 {
                    findings.push(
                        Diagnostic::error(
                            "unbalanced_quotes",
                            format!("Unbalanced quotes in SQL expression: \"{expression}\""),
                        )
                        .with_path(path.as_str())
                        .with_extra("expression", expression)
                        .with_extra("alias", alias.as_str())
                        .with_suggestion("Ensure all quotes are properly paired"),
                    );
                }
                if expression.matches('(').count() != expression.matches(')').count() {
                    findings.push(
                        Diagnostic::error(
                            "unbalanced_parentheses",
                            format!("Unbalanced parentheses in SQL expression: \"{expression}\""),
                        )
                        .with_path(path.as_str())
                        .with_extra("expression", expression)
                        .with_extra("alias", alias)
                        .with_suggestion("Ensure all parentheses are properly paired"),
                    );
                }
            }
            None if looks_like_sql_expression(expression) => findings.push(
                Diagnostic::error(
                    "sql_expression_missing_alias",
                    format!("SQL expression appears to be missing alias: \"{expression}\""),
                )
                .with_path(path)
                .with_extra("expression", expression)
                .with_suggestion("Add \"as alias_name\" to the SQL expression"),
            ),
            None => {}
        }
    }

    Ok(findings.into())
}

fn validate_column_mapping_sql_consistency(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(columns) = mapping.get("columns_mapping").and_then(Value::as_object) else {
        return Ok(RuleOutcome::NoFindings);
    };

    let declared = DeclaredColumns::from_mapping(mapping)?;
    let available = declared.all();
    let aliases: Vec<&str> = declared.aliases.iter().map(String::as_str).collect();

    let mut findings = Vec::new();
    for (source, target) in columns {
        if available.contains(source) {
            continue;
        }

        let lowered = source.to_lowercase();
        let suggestion = match available.iter().find(|c| c.to_lowercase() == lowered) {
            Some(candidate) => format!("Did you mean \"{candidate}\"? (case sensitivity issue)"),
            None if !aliases.is_empty() => format!(
                "Available aliases: {}",
                aliases
                    .iter()
                    .take(SHOWN_ALIASES)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => "Ensure the column or alias exists in source_columns_interested".to_string(),
        };

        findings.push(
            Diagnostic::error(
                "column_mapping_source_not_found",
                format!("Column mapping source \"{source}\" not found in source_columns_interested"),
            )
            .with_path(ctx.path_with("columns_mapping"))
            .with_extra("missing_column", source.as_str())
            .with_extra("target_column", target.clone())
            .with_extra(
                "available_columns",
                available.iter().map(String::as_str).collect::<Vec<_>>(),
            )
            .with_extra("available_aliases", aliases.clone())
            .with_suggestion(suggestion),
        );
    }

    Ok(findings.into())
}

fn validate_quoted_identifiers(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(entries) = source_entries(mapping) else {
        return Ok(RuleOutcome::NoFindings);
    };

    let mut findings = Vec::new();
    for (i, expression) in entries {
        let path = ctx.path_with(&format!("source_columns_interested[{i}]"));
        for quoted in quoted_identifiers(expression)? {
            if quoted.len() <= 2 {
                findings.push(
                    Diagnostic::warning(
                        "empty_quoted_identifier",
                        format!("Empty quoted identifier found: {quoted}"),
                    )
                    .with_path(path.as_str())
                    .with_extra("expression", expression)
                    .with_suggestion("Remove empty quoted identifiers or add content"),
                );
            } else if expression.contains(&format!("{quoted}\"")) {
                // `"a""b"`: a doubled quote splits one identifier in two
                findings.push(
                    Diagnostic::warning(
                        "nested_quotes_in_identifier",
                        format!("Nested quotes in identifier may need escaping: {quoted}"),
                    )
                    .with_path(path.as_str())
                    .with_extra("expression", expression)
                    .with_suggestion("Ensure proper quote escaping for nested quotes"),
                );
            }
        }
    }

    Ok(findings.into())
}

fn validate_complex_sql_expressions(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let Some(entries) = source_entries(mapping) else {
        return Ok(RuleOutcome::NoFindings);
    };

    let mut findings = Vec::new();
    for (i, expression) in entries {
        let kind = ExpressionType::identify(expression);
        if kind == ExpressionType::Simple {
            continue;
        }
        let path = ctx.path_with(&format!("source_columns_interested[{i}]"));

        match extract_alias(expression)? {
            None => findings.push(
                Diagnostic::error(
                    "complex_expression_missing_alias",
                    format!(
                        "{} expression missing required alias: \"{expression}\"",
                        kind.title()
                    ),
                )
                .with_path(path)
                .with_extra("expression", expression)
                .with_extra("expression_type", kind.as_str())
                .with_suggestion(format!(
                    "Add \"as alias_name\" to the {} expression",
                    kind.as_str()
                )),
            ),
            Some(alias) if !is_valid_identifier(&alias)? => findings.push(
                Diagnostic::error(
                    "invalid_alias_name",
                    format!(
                        "Invalid alias name \"{alias}\" for {} expression",
                        kind.as_str()
                    ),
                )
                .with_path(path)
                .with_extra("expression", expression)
                .with_extra("alias", alias)
                .with_suggestion("Use valid identifier names (letters, numbers, underscores only)"),
            ),
            Some(_) => {}
        }
    }

    Ok(findings.into())
}
