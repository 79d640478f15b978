//! Category-filtered rule engine.
//!
//! Validators register named rule functions tagged with categories, then ask
//! the engine to apply the subset whose categories intersect a selection to
//! one document node.

use crate::RuleError;
use mapping_core::{
    Diagnostic, Severity, ValidationContext, ValidationResult, ValidationResultBuilder,
};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// What a rule found.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuleOutcome {
    /// Nothing to report
    #[default]
    NoFindings,

    /// Diagnostics bucketed by their own severity
    Findings(Vec<Diagnostic>),

    /// A pre-bucketed result, merged as-is
    Report(ValidationResult),
}

impl From<Vec<Diagnostic>> for RuleOutcome {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        if diagnostics.is_empty() {
            Self::NoFindings
        } else {
            Self::Findings(diagnostics)
        }
    }
}

impl From<Diagnostic> for RuleOutcome {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Findings(vec![diagnostic])
    }
}

impl From<Option<Diagnostic>> for RuleOutcome {
    fn from(diagnostic: Option<Diagnostic>) -> Self {
        diagnostic.map_or(Self::NoFindings, Self::from)
    }
}

impl From<ValidationResult> for RuleOutcome {
    fn from(result: ValidationResult) -> Self {
        Self::Report(result)
    }
}

/// Signature of a rule function.
pub type RuleFn =
    Box<dyn Fn(&Value, &ValidationContext) -> Result<RuleOutcome, RuleError> + Send + Sync>;

/// A registered rule.
pub struct Rule {
    pub name: String,
    pub description: String,
    /// Default severity, informational only: findings carry their own
    pub severity: Severity,
    pub categories: Vec<String>,
    check: RuleFn,
}

impl Rule {
    fn matches(&self, selection: Option<&[&str]>) -> bool {
        match selection {
            None => true,
            Some(wanted) => self
                .categories
                .iter()
                .any(|category| wanted.contains(&category.as_str())),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .field("categories", &self.categories)
            .finish_non_exhaustive()
    }
}

/// Registry of rules applied in registration order.
///
/// # Example
///
/// ```rust
/// use mapping_core::{Diagnostic, Severity, ValidationContext};
/// use mapping_validator::{RuleEngine, RuleOutcome};
///
/// let mut engine = RuleEngine::new();
/// engine.register_rule(
///     "require_mappings",
///     "Documents must declare mappings",
///     Severity::Error,
///     &["structure"],
///     |data, ctx| {
///         Ok(match data.get("mappings") {
///             Some(_) => RuleOutcome::NoFindings,
///             None => Diagnostic::error("missing_section", "No mappings")
///                 .with_path(ctx.path())
///                 .into(),
///         })
///     },
/// );
///
/// let result = engine.apply_rules(&serde_json::json!({}), &ValidationContext::root(), None);
/// assert!(!result.is_valid());
/// ```
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule. A rule registered twice under one name runs twice.
    pub fn register_rule<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        categories: &[&str],
        check: F,
    ) where
        F: Fn(&Value, &ValidationContext) -> Result<RuleOutcome, RuleError> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            name: name.into(),
            description: description.into(),
            severity,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            check: Box::new(check),
        });
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules tagged with `category`.
    pub fn rules_by_category(&self, category: &str) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.categories.iter().any(|c| c == category))
            .collect()
    }

    /// Applies every rule whose categories intersect `categories` (all rules
    /// when `None`) to `data`.
    ///
    /// A rule returning `Err` contributes one `rule_execution_error` and the
    /// remaining rules still run. Diagnostics without a mapping name inherit
    /// the context's.
    pub fn apply_rules(
        &self,
        data: &Value,
        context: &ValidationContext,
        categories: Option<&[&str]>,
    ) -> ValidationResult {
        let mut builder = ValidationResultBuilder::new();
        let attach = |diagnostic: Diagnostic| match context.mapping_name.as_deref() {
            Some(name) => diagnostic.with_default_mapping(name),
            None => diagnostic,
        };

        for rule in self.rules.iter().filter(|rule| rule.matches(categories)) {
            match (rule.check)(data, context) {
                Ok(RuleOutcome::NoFindings) => {}
                Ok(RuleOutcome::Findings(diagnostics)) => {
                    builder.push_all(diagnostics.into_iter().map(attach));
                }
                Ok(RuleOutcome::Report(result)) => {
                    for diagnostic in result.errors() {
                        builder.add_error(attach(diagnostic.clone()));
                    }
                    for diagnostic in result.warnings() {
                        builder.add_warning(attach(diagnostic.clone()));
                    }
                    for diagnostic in result.info() {
                        builder.add_info(attach(diagnostic.clone()));
                    }
                }
                Err(e) => {
                    warn!(rule = %rule.name, path = %context.path(), error = %e, "Validation rule failed");
                    builder.add_error(attach(
                        Diagnostic::error(
                            "rule_execution_error",
                            format!("Validation rule \"{}\" failed: {e}", rule.name),
                        )
                        .with_path(context.path())
                        .with_extra("rule", rule.name.as_str())
                        .with_extra("exception", e.to_string()),
                    ));
                }
            }
        }

        debug!(
            path = %context.path(),
            errors = builder.error_count(),
            warnings = builder.warning_count(),
            "Rules applied"
        );
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn engine() -> RuleEngine {
        let mut engine = RuleEngine::new();
        engine.register_rule("first", "", Severity::Error, &["structure"], |_, ctx| {
            Ok(Diagnostic::error("first_finding", "first").with_path(ctx.path()).into())
        });
        engine.register_rule("second", "", Severity::Warning, &["quality"], |_, _| {
            Ok(vec![
                Diagnostic::warning("second_warning", "second"),
                Diagnostic::info("second_info", "second"),
            ]
            .into())
        });
        engine.register_rule("broken", "", Severity::Error, &["structure", "broken"], |_, _| {
            Err(RuleError::general("exploded"))
        });
        engine
    }

    #[test]
    fn test_registration_order_and_filtering() {
        let engine = engine();
        let ctx = ValidationContext::new("mappings[0]");

        let all = engine.apply_rules(&json!({}), &ctx, None);
        assert_eq!(all.error_types(), vec!["first_finding", "rule_execution_error"]);
        assert_eq!(all.warning_types(), vec!["second_warning"]);
        assert_eq!(all.info().len(), 1);

        let quality = engine.apply_rules(&json!({}), &ctx, Some(&["quality"]));
        assert!(quality.is_valid());
        assert_eq!(quality.warnings().len(), 1);

        let none = engine.apply_rules(&json!({}), &ctx, Some(&["settings"]));
        assert!(none.all_messages().is_empty());
    }

    #[test]
    fn test_rule_failure_is_isolated() {
        let engine = engine();
        let result = engine.apply_rules(
            &json!({}),
            &ValidationContext::new("mappings[1]"),
            Some(&["broken", "quality"]),
        );

        let failures = result.errors_by_type("rule_execution_error");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message(), "Validation rule \"broken\" failed: exploded");
        assert_eq!(failures[0].path(), Some("mappings[1]"));
        assert_eq!(failures[0].extra("rule"), Some(&json!("broken")));
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_report_keeps_bucket_membership() {
        let mut engine = RuleEngine::new();
        engine.register_rule("report", "", Severity::Warning, &["consistency"], |_, _| {
            let mut builder = ValidationResultBuilder::new();
            builder.add_error(Diagnostic::warning("flagged", "warning kept in errors"));
            Ok(builder.build().into())
        });

        let result = engine.apply_rules(&json!({}), &ValidationContext::root(), None);
        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_mapping_name_is_inherited() {
        let mut engine = RuleEngine::new();
        engine.register_rule("named", "", Severity::Error, &["mapping"], |_, _| {
            Ok(vec![
                Diagnostic::error("anonymous", "no mapping"),
                Diagnostic::error("named", "has mapping").with_mapping("explicit"),
            ]
            .into())
        });

        let ctx = ValidationContext::new("mappings[0]").with_mapping("orders");
        let result = engine.apply_rules(&json!({}), &ctx, None);
        assert_eq!(result.errors()[0].mapping_name(), Some("orders"));
        assert_eq!(result.errors()[1].mapping_name(), Some("explicit"));
    }

    #[test]
    fn test_outcome_conversions() {
        assert_eq!(RuleOutcome::from(Vec::new()), RuleOutcome::NoFindings);
        assert_eq!(RuleOutcome::from(None::<Diagnostic>), RuleOutcome::NoFindings);
        assert!(matches!(
            RuleOutcome::from(Some(Diagnostic::info("k", "m"))),
            RuleOutcome::Findings(d) if d.len() == 1
        ));
    }

    #[test]
    fn test_rules_by_category() {
        let engine = engine();
        let names: Vec<&str> = engine
            .rules_by_category("structure")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "broken"]);
    }
}
