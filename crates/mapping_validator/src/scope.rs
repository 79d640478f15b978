//! Start/end logging and timing around a validation entry point.

use mapping_core::{ValidationMetrics, ValidationResult};
use serde_json::Value;
use tracing::{info, warn};

/// Runs `run` with a fresh [`ValidationMetrics`], then attaches the metrics
/// to the returned result.
///
/// Counters the closure sets on the metrics are kept. `duration_seconds`,
/// `errors_found` and `warnings_found` always come from this scope; any other
/// metric already present on the result is preserved.
///
/// # Example
///
/// ```rust
/// use mapping_core::ValidationResult;
/// use mapping_validator::timed_scope;
///
/// let result = timed_scope("validate_nothing", |metrics| {
///     metrics.mappings_validated = 3;
///     ValidationResult::success("done")
/// });
///
/// let metrics = result.performance_metrics().unwrap();
/// assert_eq!(metrics["mappings_validated"], 3);
/// assert_eq!(metrics["errors_found"], 0);
/// ```
pub fn timed_scope<F>(name: &str, run: F) -> ValidationResult
where
    F: FnOnce(&mut ValidationMetrics) -> ValidationResult,
{
    info!(scope = name, "Starting {name}");

    let mut metrics = ValidationMetrics::start();
    let result = run(&mut metrics);
    metrics.errors_found = result.errors().len();
    metrics.warnings_found = result.warnings().len();
    metrics.finish();

    let mut combined = metrics.to_map();
    if let Some(existing) = result.performance_metrics() {
        for (key, value) in existing {
            if !matches!(
                key.as_str(),
                "duration_seconds" | "errors_found" | "warnings_found"
            ) {
                combined.insert(key.clone(), value.clone());
            }
        }
    }

    if result.is_valid() {
        info!(
            scope = name,
            duration = metrics.duration().as_secs_f64(),
            "{name} completed successfully"
        );
    } else {
        warn!(
            scope = name,
            errors = metrics.errors_found,
            "{name} completed with errors"
        );
    }

    result.with_performance_metrics(combined)
}

/// Reads an unsigned counter from a result's performance metrics.
pub(crate) fn metric_count(result: &ValidationResult, key: &str) -> u64 {
    result
        .performance_metrics()
        .and_then(|metrics| metrics.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapping_core::{Diagnostic, ValidationResultBuilder};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    #[test]
    fn test_counts_come_from_result() {
        let result = timed_scope("scope", |_| {
            let mut builder = ValidationResultBuilder::new();
            builder.add_error(Diagnostic::error("a", "a"));
            builder.add_warning(Diagnostic::warning("b", "b"));
            builder.add_warning(Diagnostic::warning("c", "c"));
            builder.build()
        });

        assert_eq!(metric_count(&result, "errors_found"), 1);
        assert_eq!(metric_count(&result, "warnings_found"), 2);
        assert!(result.performance_metrics().unwrap()["duration_seconds"].is_f64());
    }

    #[test]
    fn test_existing_metrics_survive() {
        let result = timed_scope("scope", |metrics| {
            metrics.operations_validated = 4;
            let mut inner = Map::new();
            inner.insert("rules_applied".into(), json!(9));
            inner.insert("errors_found".into(), json!(99));
            ValidationResult::success("ok").with_performance_metrics(inner)
        });

        assert_eq!(metric_count(&result, "operations_validated"), 4);
        assert_eq!(metric_count(&result, "rules_applied"), 9);
        assert_eq!(metric_count(&result, "errors_found"), 0);
    }
}
