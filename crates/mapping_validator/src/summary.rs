//! Human-readable and JSON renderings of a [`ValidationResult`].

use mapping_core::ValidationResult;
use serde::Serialize;
use serde_json::{Map, Value, json};

const RULE: &str = "======================================================================";
const DETAILED_ERRORS: usize = 10;
const SHOWN_SUGGESTIONS: usize = 5;

/// Multi-line report with counts, error breakdown, affected mappings, the
/// first ten errors, suggestions and performance metrics.
pub fn detailed_summary(result: &ValidationResult, include_suggestions: bool) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "VALIDATION SUMMARY".to_string(),
        RULE.to_string(),
        format!("Status: {}", status(result)),
        String::new(),
        format!("Errors: {}", result.errors().len()),
        format!("Warnings: {}", result.warnings().len()),
        format!("Info: {}", result.info().len()),
        String::new(),
    ];

    if result.has_errors() {
        lines.push("ERROR BREAKDOWN:".to_string());
        for (kind, count) in result.error_summary() {
            lines.push(format!("  - {kind}: {count}"));
        }
        lines.push(String::new());
    }

    let affected = result.affected_mappings();
    if !affected.is_empty() {
        lines.push(format!("AFFECTED MAPPINGS ({}):", affected.len()));
        for mapping in &affected {
            let issues = result.messages_by_mapping(mapping).len();
            lines.push(format!("  - {mapping}: {issues} issues"));
        }
        lines.push(String::new());
    }

    if result.has_errors() {
        lines.push("DETAILED ERRORS:".to_string());
        for (i, diagnostic) in result.errors().iter().take(DETAILED_ERRORS).enumerate() {
            lines.push(format!(
                "  {}. [{}] {}",
                i + 1,
                diagnostic.path().unwrap_or("unknown"),
                diagnostic.message()
            ));
        }
        if result.errors().len() > DETAILED_ERRORS {
            lines.push(format!(
                "  ... and {} more errors",
                result.errors().len() - DETAILED_ERRORS
            ));
        }
        lines.push(String::new());
    }

    if include_suggestions {
        let suggestions = result.suggestions();
        if !suggestions.is_empty() {
            lines.push("SUGGESTIONS:".to_string());
            for suggestion in suggestions.iter().take(SHOWN_SUGGESTIONS) {
                lines.push(format!("  * {suggestion}"));
            }
            if suggestions.len() > SHOWN_SUGGESTIONS {
                lines.push(format!(
                    "  ... and {} more suggestions",
                    suggestions.len() - SHOWN_SUGGESTIONS
                ));
            }
            lines.push(String::new());
        }
    }

    if let Some(metrics) = result.performance_metrics() {
        lines.push("PERFORMANCE METRICS:".to_string());
        for (key, value) in metrics {
            lines.push(format!("  - {key}: {value}"));
        }
        lines.push(String::new());
    }

    lines.push(RULE.to_string());
    lines.join("\n")
}

/// One line: `VALID (0 errors, 2 warnings) 1 mappings affected`.
pub fn compact_summary(result: &ValidationResult) -> String {
    let mut line = format!(
        "{} ({} errors, {} warnings)",
        status(result),
        result.errors().len(),
        result.warnings().len()
    );
    let affected = result.affected_mappings().len();
    if affected > 0 {
        line.push_str(&format!(" {affected} mappings affected"));
    }
    line
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSummary {
    pub status: &'static str,
    pub summary: Value,
    pub error_breakdown: Map<String, Value>,
    pub warning_breakdown: Map<String, Value>,
    pub suggestions: Vec<String>,
    pub performance: Option<Map<String, Value>>,
}

/// Serializable digest of a result.
pub fn json_summary(result: &ValidationResult) -> JsonSummary {
    let breakdown = |counts: Vec<(&str, usize)>| -> Map<String, Value> {
        counts
            .into_iter()
            .map(|(kind, count)| (kind.to_string(), json!(count)))
            .collect()
    };

    JsonSummary {
        status: if result.is_valid() { "valid" } else { "invalid" },
        summary: json!({
            "error_count": result.errors().len(),
            "warning_count": result.warnings().len(),
            "info_count": result.info().len(),
            "affected_mappings": result.affected_mappings(),
        }),
        error_breakdown: breakdown(result.error_summary()),
        warning_breakdown: breakdown(result.warning_summary()),
        suggestions: result.suggestions().into_iter().map(str::to_string).collect(),
        performance: result.performance_metrics().cloned(),
    }
}

fn status(result: &ValidationResult) -> &'static str {
    if result.is_valid() { "VALID" } else { "INVALID" }
}
