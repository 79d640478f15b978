//! Mode-driven job validation with history and reporting.

use crate::{
    ConsistencyAnalysis, OperationRegistry, SqlExpressionValidator, ValidatorError,
    count_sql_expressions,
};
use chrono::{DateTime, Utc};
use mapping_core::document::{mapping_label, mapping_name_or_unknown, mappings};
use mapping_core::{Diagnostic, ValidationResult};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Entries kept by [`JobValidator::history`].
pub const HISTORY_LIMIT: usize = 50;

pub const VALIDATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

const SQL_KEYWORDS: [&str; 4] = ["sql", "expression", "alias", "mapping"];
const RULE: &str = "============================================================";

/// Which validator layers a [`JobValidator`] runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Column transformations only
    Standard,
    /// Every section of the document
    #[default]
    Comprehensive,
    /// Every section plus SQL expression checks
    SqlEnhanced,
}

impl ValidationMode {
    pub const ALL: [ValidationMode; 3] = [Self::Standard, Self::Comprehensive, Self::SqlEnhanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Comprehensive => "comprehensive",
            Self::SqlEnhanced => "sql_enhanced",
        }
    }

    /// Short description appended to job and mapping summaries.
    pub fn scope(self) -> &'static str {
        match self {
            Self::Standard => "Column transformations only",
            Self::Comprehensive => "All YAML sections (standard comprehensive)",
            Self::SqlEnhanced => "All YAML sections + SQL Expression validation",
        }
    }

    fn scope_title(self) -> &'static str {
        match self {
            Self::Standard => "Column Transformations",
            Self::Comprehensive => "Column Transformations + All YAML Sections",
            Self::SqlEnhanced => "Column Transformations + All YAML Sections + SQL Expressions",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(Self::Standard),
            "comprehensive" => Ok(Self::Comprehensive),
            "sql_enhanced" => Ok(Self::SqlEnhanced),
            _ => Err(ValidatorError::UnknownMode(s.to_string())),
        }
    }
}

/// One stored validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub is_valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Per-mapping outcome of [`JobValidator::validate_all_mappings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingOutcome {
    pub mapping_name: String,
    pub index: usize,
    pub is_valid: bool,
    pub summary: String,
}

/// SQL expression counts for one validated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SqlAnalysis {
    pub expression_count: usize,
    pub mappings_with_sql: usize,
    /// Errors whose kind mentions sql, expression, alias or mapping
    pub sql_errors: usize,
    pub sql_warnings: usize,
}

impl SqlAnalysis {
    pub fn of(result: &ValidationResult, document: &Value) -> Self {
        let (expression_count, mappings_with_sql) = count_sql_expressions(document);
        Self {
            expression_count,
            mappings_with_sql,
            sql_errors: result.errors().iter().filter(|d| is_sql_related(d.kind())).count(),
            sql_warnings: result
                .warnings()
                .iter()
                .filter(|d| is_sql_related(d.kind()))
                .count(),
        }
    }
}

fn is_sql_related(text: &str) -> bool {
    let lower = text.to_lowercase();
    SQL_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub affected_mappings: Vec<String>,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub timestamp: DateTime<Utc>,
    pub validator_version: String,
    pub validation_history_count: usize,
}

/// Machine-readable report of one job validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    /// `valid` or `invalid`
    pub overall_status: String,
    pub validation_mode: ValidationMode,
    pub summary: ReportSummary,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub info: Vec<Diagnostic>,
    pub error_summary: Map<String, Value>,
    pub warning_summary: Map<String, Value>,
    pub suggestions: Vec<String>,
    pub performance_metrics: Option<Map<String, Value>>,
    pub consistency_analysis: ConsistencyAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_analysis: Option<SqlAnalysis>,
    pub validation_metadata: ReportMetadata,
}

/// Validates job documents in one of three [`ValidationMode`]s and keeps a
/// bounded history of outcomes.
///
/// By default every result is deduplicated on `(kind, message, path)`
/// before it is returned or recorded; see
/// [`with_deduplication`](Self::with_deduplication).
///
/// # Example
///
/// ```rust
/// use mapping_validator::{JobValidator, ValidationMode};
/// use serde_json::json;
///
/// let document = json!({
///     "mappings": [{
///         "mapping_name": "orders",
///         "source_columns_interested": ["id as rid"],
///         "column_transformations": [{
///             "source_alias": "rid",
///             "target_column": "record_id",
///             "data_type": "BIGINT",
///             "transformation_type": "direct_mapping"
///         }]
///     }]
/// });
///
/// let mut validator = JobValidator::new(ValidationMode::Comprehensive);
/// let (valid, summary) = validator.validate_job_configuration(&document);
/// assert!(valid);
/// assert!(summary.starts_with("Job configuration validation passed with 0 warnings"));
/// assert_eq!(validator.history().len(), 1);
/// ```
pub struct JobValidator {
    mode: ValidationMode,
    validator: SqlExpressionValidator,
    history: VecDeque<HistoryEntry>,
    deduplicate: bool,
}

impl Default for JobValidator {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

impl JobValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self::with_registry(OperationRegistry::shared(), mode)
    }

    pub fn with_registry(registry: Arc<OperationRegistry>, mode: ValidationMode) -> Self {
        info!(component = "job_validator", mode = %mode, "Job validator initialized");
        Self {
            mode,
            validator: SqlExpressionValidator::with_registry(registry),
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            deduplicate: true,
        }
    }

    /// Keeps repeated `(kind, message, path)` diagnostics when `false`.
    pub fn with_deduplication(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    pub fn deduplicates(&self) -> bool {
        self.deduplicate
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ValidationMode) {
        self.mode = mode;
        info!(component = "job_validator", mode = %mode, "Validation mode set");
    }

    /// Oldest first.
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        info!(component = "job_validator", "Validation history cleared");
    }

    /// Validates without recording history.
    pub fn run(&self, document: &Value) -> ValidationResult {
        let result = match self.mode {
            ValidationMode::Standard => self
                .validator
                .comprehensive()
                .structural()
                .validate(document),
            ValidationMode::Comprehensive => self.validator.comprehensive().validate(document),
            ValidationMode::SqlEnhanced => self.validator.validate(document),
        };
        if self.deduplicate {
            result.deduplicated()
        } else {
            result
        }
    }

    pub fn validate(&mut self, document: &Value) -> ValidationResult {
        let result = self.run(document);
        self.record("validation", &result);
        result
    }

    /// Returns validity and a one-line summary naming the validation scope.
    pub fn validate_job_configuration(&mut self, document: &Value) -> (bool, String) {
        info!(component = "job_validator", mode = %self.mode, "Starting job configuration validation");
        let result = self.run(document);
        self.record("job_config", &result);

        let scope = self.mode.scope();
        if result.is_valid() {
            info!(component = "job_validator", "Job configuration validation passed");
            self.log_insights(&result, document);
            (
                true,
                format!(
                    "Job configuration validation passed with {} warnings ({scope})",
                    result.warnings().len()
                ),
            )
        } else {
            error!(component = "job_validator", "Job configuration validation failed");
            report_by_section(&result);
            (
                false,
                format!(
                    "Job configuration validation failed with {} errors ({scope})",
                    result.errors().len()
                ),
            )
        }
    }

    /// Validates one mapping as if it were the only one in the document.
    pub fn validate_mapping_configuration(&mut self, mapping: &Value) -> (bool, String) {
        let name = mapping_name_or_unknown(mapping);
        if mapping.get("column_transformations").is_none() {
            info!(component = "job_validator", mapping = %name, "No column transformations, validating other sections");
        }

        let result = self.run(&json!({ "mappings": [mapping] }));
        self.record(&format!("mapping_{name}"), &result);

        let scope = self.mode.scope();
        if result.is_valid() {
            if result.has_warnings() {
                warn!(
                    component = "job_validator",
                    mapping = %name,
                    warnings = result.warnings().len(),
                    "Mapping validation warnings"
                );
            }
            (
                true,
                format!(
                    "Mapping {name} validation passed with {} warnings ({scope})",
                    result.warnings().len()
                ),
            )
        } else {
            for diagnostic in result.errors() {
                error!(
                    component = "job_validator",
                    mapping = %name,
                    path = diagnostic.path().unwrap_or("unknown"),
                    "{}",
                    diagnostic.message()
                );
            }
            (
                false,
                format!(
                    "Mapping {name} validation failed with {} errors ({scope})",
                    result.errors().len()
                ),
            )
        }
    }

    /// Validates every mapping separately.
    pub fn validate_all_mappings(&mut self, document: &Value) -> (bool, Vec<MappingOutcome>) {
        let all = mappings(document);
        info!(component = "job_validator", count = all.len(), "Validating mappings");

        let outcomes: Vec<MappingOutcome> = all
            .iter()
            .enumerate()
            .map(|(index, mapping)| {
                let (is_valid, summary) = self.validate_mapping_configuration(mapping);
                MappingOutcome {
                    mapping_name: mapping_label(mapping, index),
                    index,
                    is_valid,
                    summary,
                }
            })
            .collect();

        let valid = outcomes.iter().filter(|o| o.is_valid).count();
        info!(component = "job_validator", "Mapping validation complete: {valid}/{} valid", outcomes.len());
        (valid == outcomes.len(), outcomes)
    }

    /// Orphan-based consistency score of a result.
    pub fn consistency_score(result: &ValidationResult) -> ConsistencyAnalysis {
        ConsistencyAnalysis::from_result(result)
    }

    /// Multi-line human-readable summary.
    pub fn validation_summary(&self, document: &Value) -> String {
        let result = self.run(document);
        let mut lines: Vec<String> = vec![
            RULE.to_string(),
            "JOB VALIDATION SUMMARY".to_string(),
            RULE.to_string(),
            format!(
                "Overall Status: {}",
                if result.is_valid() { "VALID" } else { "INVALID" }
            ),
            format!("Validation Mode: {}", self.mode.as_str().to_uppercase()),
            format!("Validation Scope: {}", self.mode.scope_title()),
            String::new(),
            "Validation Results:".to_string(),
            format!("  • Errors: {}", result.errors().len()),
            format!("  • Warnings: {}", result.warnings().len()),
            format!("  • Info messages: {}", result.info().len()),
            String::new(),
        ];

        if self.mode == ValidationMode::SqlEnhanced {
            let sql = SqlAnalysis::of(&result, document);
            if sql.expression_count > 0 {
                lines.push("SQL Expression Analysis:".to_string());
                lines.push(format!("  • SQL expressions found: {}", sql.expression_count));
                lines.push(format!("  • Mappings with SQL expressions: {}", sql.mappings_with_sql));
                lines.push(format!("  • SQL expression errors: {}", sql.sql_errors));
                lines.push(format!("  • SQL expression warnings: {}", sql.sql_warnings));
                lines.push(String::new());
            }
        }

        if let Some(all) = document.get("mappings").and_then(Value::as_array) {
            let affected: Vec<&str> = result.affected_mappings().into_iter().collect();
            lines.push("Mapping Analysis:".to_string());
            lines.push(format!("  • Total mappings: {}", all.len()));
            lines.push(format!("  • Mappings with issues: {}", affected.len()));
            if !affected.is_empty() {
                let shown: Vec<&str> = affected.iter().take(3).copied().collect();
                lines.push(format!("  • Affected mappings: {}", shown.join(", ")));
            }
            lines.push(String::new());
        }

        if let Some(settings) = document.get("settings").and_then(Value::as_object) {
            let text = |key: &str| {
                settings
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("not_specified")
                    .to_string()
            };
            lines.push("Settings Analysis:".to_string());
            lines.push(format!("  • Load mode: {}", text("load")));
            lines.push(format!("  • Environment: {}", text("environment")));
            lines.push(format!(
                "  • Has partition settings: {}",
                settings.contains_key("default_partition_settings")
            ));
            lines.push(String::new());
        }

        if result.has_errors() {
            lines.push("Top Error Types:".to_string());
            for (kind, count) in result.error_summary().into_iter().take(5) {
                lines.push(format!("  • {kind}: {count}"));
            }
            lines.push(String::new());
        }

        let consistency = ConsistencyAnalysis::from_result(&result);
        lines.push("Cross-Section Consistency:".to_string());
        lines.push(format!("  • Consistency score: {}/100", consistency.score));
        lines.push(format!("  • Issues found: {}", consistency.total_issues));
        lines.push(String::new());

        if let Some(metrics) = result.performance_metrics() {
            let count = |key: &str| metrics.get(key).and_then(Value::as_u64).unwrap_or(0);
            let duration = metrics
                .get("duration_seconds")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            lines.push("Performance Metrics:".to_string());
            lines.push(format!("  • Validation time: {duration:.3}s"));
            lines.push(format!("  • Operations validated: {}", count("operations_validated")));
            lines.push(format!(
                "  • Transformations validated: {}",
                count("transformations_validated")
            ));
            lines.push(String::new());
        }

        let suggestions = result.suggestions();
        if !suggestions.is_empty() {
            lines.push("Top Suggestions:".to_string());
            for suggestion in suggestions.into_iter().take(3) {
                lines.push(format!("  • {suggestion}"));
            }
            lines.push(String::new());
        }

        if !self.history.is_empty() {
            let successful = self.history.iter().filter(|h| h.is_valid).count();
            lines.push("Validation History:".to_string());
            lines.push(format!("  • Total validations performed: {}", self.history.len()));
            lines.push(format!("  • Successful validations: {successful}"));
            lines.push(String::new());
        }

        lines.push(RULE.to_string());
        lines.join("\n")
    }

    pub fn validation_report(&self, document: &Value) -> JobReport {
        let result = self.run(document);
        let counts = |summary: Vec<(&str, usize)>| -> Map<String, Value> {
            summary
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), json!(count)))
                .collect()
        };

        JobReport {
            overall_status: if result.is_valid() { "valid" } else { "invalid" }.to_string(),
            validation_mode: self.mode,
            summary: ReportSummary {
                error_count: result.errors().len(),
                warning_count: result.warnings().len(),
                info_count: result.info().len(),
                affected_mappings: result
                    .affected_mappings()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                success_rate: if result.is_valid() { 1.0 } else { 0.0 },
            },
            errors: result.errors().to_vec(),
            warnings: result.warnings().to_vec(),
            info: result.info().to_vec(),
            error_summary: counts(result.error_summary()),
            warning_summary: counts(result.warning_summary()),
            suggestions: result.suggestions().into_iter().map(str::to_string).collect(),
            performance_metrics: result.performance_metrics().cloned(),
            consistency_analysis: ConsistencyAnalysis::from_result(&result),
            sql_analysis: (self.mode == ValidationMode::SqlEnhanced)
                .then(|| SqlAnalysis::of(&result, document)),
            validation_metadata: ReportMetadata {
                timestamp: Utc::now(),
                validator_version: VALIDATOR_VERSION.to_string(),
                validation_history_count: self.history.len(),
            },
        }
    }

    fn record(&mut self, label: &str, result: &ValidationResult) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry {
            label: label.to_string(),
            timestamp: Utc::now(),
            is_valid: result.is_valid(),
            error_count: result.errors().len(),
            warning_count: result.warnings().len(),
        });
    }

    fn log_insights(&self, result: &ValidationResult, document: &Value) {
        let consistency = ConsistencyAnalysis::from_result(result);
        match consistency.total_issues {
            0 => info!(component = "job_validator", "Cross-section consistency: EXCELLENT (100/100)"),
            1..=2 => warn!(
                component = "job_validator",
                "Cross-section consistency: GOOD ({}/100)",
                consistency.score
            ),
            _ => warn!(
                component = "job_validator",
                "Cross-section consistency: NEEDS ATTENTION ({}/100)",
                consistency.score
            ),
        }

        if self.mode == ValidationMode::SqlEnhanced {
            let sql = SqlAnalysis::of(result, document);
            if sql.expression_count > 0 {
                info!(
                    component = "job_validator",
                    expressions = sql.expression_count,
                    mappings = sql.mappings_with_sql,
                    "SQL expression insights"
                );
            }
        }
    }
}

/// Logs errors grouped by the top-level section of their path.
fn report_by_section(result: &ValidationResult) {
    let mut sections: Vec<(&str, Vec<&str>)> = Vec::new();
    for diagnostic in result.errors() {
        let section = section_of(diagnostic.path().unwrap_or("unknown"));
        match sections.iter_mut().find(|(s, _)| *s == section) {
            Some((_, messages)) => messages.push(diagnostic.message()),
            None => sections.push((section, vec![diagnostic.message()])),
        }
    }

    error!(
        component = "job_validator",
        "Found {} validation errors across {} sections",
        result.errors().len(),
        sections.len()
    );
    for (section, messages) in &sections {
        error!(component = "job_validator", section = *section, errors = messages.len(), "Section errors");
        for message in messages.iter().take(2) {
            error!(component = "job_validator", section = *section, "  {message}");
        }
    }
}

/// `mappings[0].columns_mapping` → `mappings`.
fn section_of(path: &str) -> &str {
    path.split(['.', '[']).next().unwrap_or(path)
}
