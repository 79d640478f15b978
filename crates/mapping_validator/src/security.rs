//! Pattern-based SQL injection scanning for source column expressions.
//!
//! Three passes run over each raw expression: dangerous statement patterns
//! (critical), suspicious function names matched on word boundaries
//! (critical) and a nesting-depth check for very long expressions (warning).
//! The scanner never fails: a pattern that cannot be compiled is reported
//! as a `sql_security_validation_exception` warning.

use mapping_core::Diagnostic;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

/// Statement patterns that indicate injection attempts, in scan order.
pub const DANGEROUS_PATTERNS: [&str; 12] = [
    r"\b(exec|execute)\s*\(",
    r"\b(sp_|xp_)\w+",
    r"--.*?$",
    r"/\*.*?\*/",
    r"\b(union|intersect|except)\s+select\b",
    r"\b(drop|create|alter|truncate)\s+\w+",
    r"\binto\s+outfile\b",
    r"\bload_file\s*\(",
    r";.*?(drop|delete|insert|update|create)",
    r"\bwaitfor\s+delay\b",
    r"\bbenchmark\s*\(",
    r"\bsleep\s*\(",
];

/// Function names that should not appear in a column expression.
pub const SUSPICIOUS_FUNCTIONS: [&str; 9] = [
    "xp_cmdshell",
    "sp_configure",
    "openrowset",
    "opendatasource",
    "exec",
    "execute",
    "eval",
    "script",
    "shell",
];

const MAX_EXPRESSION_LENGTH: usize = 1000;
const MAX_NESTING_LEVEL: usize = 10;
const EXCERPT_LENGTH: usize = 100;

struct Scanner {
    dangerous: Vec<(&'static str, Regex)>,
    functions: Vec<(&'static str, Regex)>,
}

static SCANNER: LazyLock<Result<Scanner, regex::Error>> = LazyLock::new(|| {
    let dangerous = DANGEROUS_PATTERNS
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .map(|regex| (*pattern, regex))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let functions = SUSPICIOUS_FUNCTIONS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))).map(|regex| (*name, regex))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scanner {
        dangerous,
        functions,
    })
});

/// Scans one expression and returns its security findings.
///
/// Findings carry no path or mapping; callers attach both.
///
/// ```rust
/// use mapping_validator::scan_expression;
///
/// let findings = scan_expression("id; DROP TABLE users; --");
/// assert!(findings.iter().any(|d| d.kind() == "sql_security_risk"));
///
/// assert!(scan_expression("subscription_id as sub_id").is_empty());
/// ```
pub fn scan_expression(expression: &str) -> Vec<Diagnostic> {
    let scanner = match SCANNER.as_ref() {
        Ok(scanner) => scanner,
        Err(e) => {
            warn!(error = %e, "SQL security patterns failed to compile");
            return vec![
                Diagnostic::warning(
                    "sql_security_validation_exception",
                    format!("Security validation failed: {e}"),
                )
                .with_extra("exception", e.to_string())
                .with_suggestion("Review SQL security validation logic"),
            ];
        }
    };

    let excerpt = excerpt(expression);
    let mut findings = Vec::new();

    for (pattern, regex) in &scanner.dangerous {
        if regex.is_match(expression) {
            findings.push(
                Diagnostic::critical(
                    "sql_security_risk",
                    format!("Potentially dangerous SQL pattern detected: {pattern}"),
                )
                .with_extra("expression", excerpt.as_str())
                .with_extra("pattern", *pattern)
                .with_extra("security_level", "high_risk")
                .with_suggestion("Review and sanitize SQL expression to prevent injection attacks"),
            );
        }
    }

    for (name, regex) in &scanner.functions {
        if regex.is_match(expression) {
            findings.push(
                Diagnostic::critical(
                    "suspicious_sql_function",
                    format!("Suspicious SQL function detected: {name}"),
                )
                .with_extra("function", *name)
                .with_extra("expression", excerpt.as_str())
                .with_suggestion(format!("Remove or replace {name} function if not necessary")),
            );
        }
    }

    if expression.chars().count() > MAX_EXPRESSION_LENGTH {
        let nesting = expression
            .matches('(')
            .count()
            .abs_diff(expression.matches(')').count());
        if nesting > MAX_NESTING_LEVEL {
            findings.push(
                Diagnostic::warning(
                    "sql_complexity_warning",
                    "Extremely complex SQL expression detected",
                )
                .with_extra("expression_length", expression.chars().count())
                .with_extra("nesting_level", nesting)
                .with_suggestion(
                    "Consider breaking down complex expressions for security and maintainability",
                ),
            );
        }
    }

    findings
}

fn excerpt(expression: &str) -> String {
    if expression.chars().count() > EXCERPT_LENGTH {
        let head: String = expression.chars().take(EXCERPT_LENGTH).collect();
        format!("{head}...")
    } else {
        expression.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapping_core::Severity;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn kinds(expression: &str) -> Vec<String> {
        scan_expression(expression)
            .iter()
            .map(|d| d.kind().to_string())
            .collect()
    }

    #[test]
    fn test_patterns_compile() {
        assert!(SCANNER.is_ok());
    }

    #[test]
    fn test_statement_chaining() {
        let findings = scan_expression("id; DROP TABLE users; --");
        assert!(findings.iter().all(|d| d.severity() == Severity::Critical));
        let patterns: Vec<&str> = findings
            .iter()
            .filter_map(|d| d.extra("pattern").and_then(|v| v.as_str()))
            .collect();
        assert!(patterns.contains(&r"--.*?$"));
        assert!(patterns.contains(&r"\b(drop|create|alter|truncate)\s+\w+"));
        assert!(patterns.contains(&r";.*?(drop|delete|insert|update|create)"));
        assert!(findings[0].message().starts_with("Potentially dangerous SQL pattern detected: "));
    }

    #[test]
    fn test_function_names_need_word_boundaries() {
        assert!(kinds("subscription_id as sub_id").is_empty());
        assert!(kinds("execute_summary").is_empty());
        assert!(kinds("shell_company_flag").is_empty());

        let found = kinds("id, exec('x') as r");
        assert!(found.contains(&"suspicious_sql_function".to_string()));
        assert!(found.contains(&"sql_security_risk".to_string()));
    }

    #[test]
    fn test_timing_primitives() {
        assert!(kinds("SLEEP(5) as s").contains(&"sql_security_risk".to_string()));
        assert!(kinds("x WAITFOR DELAY '0:0:5'").contains(&"sql_security_risk".to_string()));
        assert!(kinds("1 UNION SELECT password").contains(&"sql_security_risk".to_string()));
    }

    #[test]
    fn test_audit_columns_are_clean() {
        for column in ["created_by", "CREATED_DT", "last_upd as updated", "\"t\".\"id\""] {
            assert!(kinds(column).is_empty(), "{column}");
        }
    }

    #[test]
    fn test_excerpt_is_truncated() {
        let long = format!("{}; drop table x", "a".repeat(150));
        let findings = scan_expression(&long);
        let expression = findings[0].extra("expression").and_then(|v| v.as_str()).unwrap();
        assert_eq!(expression.len(), 103);
        assert!(expression.ends_with("..."));
    }

    #[test]
    fn test_deep_nesting_warning() {
        let nested = format!("{}a", "(".repeat(20)) + &"b".repeat(1000);
        let findings = scan_expression(&nested);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind(), "sql_complexity_warning");
        assert_eq!(findings[0].severity(), Severity::Warning);
        assert_eq!(findings[0].extra("nesting_level"), Some(&json!(20)));

        let balanced = format!("{}a{}", "(".repeat(20), ")".repeat(20)) + &"b".repeat(1000);
        assert!(scan_expression(&balanced).is_empty());
    }
}
