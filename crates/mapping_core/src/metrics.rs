//! Timing and counting for a validation run.

use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};

/// Counters collected while a validation entry point runs.
#[derive(Debug, Clone)]
pub struct ValidationMetrics {
    started: Instant,
    duration: Option<Duration>,
    pub operations_validated: usize,
    pub transformations_validated: usize,
    pub mappings_validated: usize,
    pub errors_found: usize,
    pub warnings_found: usize,
    /// Free-form data added by the entry point
    pub performance_data: Map<String, Value>,
}

impl Default for ValidationMetrics {
    fn default() -> Self {
        Self::start()
    }
}

impl ValidationMetrics {
    /// Starts the clock.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            duration: None,
            operations_validated: 0,
            transformations_validated: 0,
            mappings_validated: 0,
            errors_found: 0,
            warnings_found: 0,
            performance_data: Map::new(),
        }
    }

    /// Stops the clock. Later calls keep the first measurement.
    pub fn finish(&mut self) {
        if self.duration.is_none() {
            self.duration = Some(self.started.elapsed());
        }
    }

    /// Elapsed time, measured up to [`finish`](Self::finish) when called.
    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn record(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.performance_data.insert(key.into(), value.into());
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let value = json!({
            "duration_seconds": self.duration().as_secs_f64(),
            "operations_validated": self.operations_validated,
            "transformations_validated": self.transformations_validated,
            "mappings_validated": self.mappings_validated,
            "errors_found": self.errors_found,
            "warnings_found": self.warnings_found,
            "performance_data": self.performance_data,
        });
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_map_keys() {
        let mut metrics = ValidationMetrics::start();
        metrics.mappings_validated = 2;
        metrics.record("rules_applied", 7);
        metrics.finish();

        let map = metrics.to_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "duration_seconds",
                "operations_validated",
                "transformations_validated",
                "mappings_validated",
                "errors_found",
                "warnings_found",
                "performance_data",
            ]
        );
        assert_eq!(map["mappings_validated"], json!(2));
        assert_eq!(map["performance_data"]["rules_applied"], json!(7));
    }

    #[test]
    fn test_finish_freezes_duration() {
        let mut metrics = ValidationMetrics::start();
        metrics.finish();
        let first = metrics.duration();
        metrics.finish();
        assert_eq!(metrics.duration(), first);
    }
}
