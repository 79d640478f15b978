//! A single validation finding.

use crate::Severity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// One validation finding.
///
/// Serializes to a flat JSON object: `type`, `message`, `severity`,
/// optional `path` and `mapping`, followed by any extra context keys
/// (`suggestion`, `valid_values`, `expression`, ...).
///
/// A diagnostic is built once with the consuming `with_*` methods and is not
/// mutated afterwards.
///
/// # Example
///
/// ```rust
/// use mapping_core::{Diagnostic, Severity};
///
/// let diagnostic = Diagnostic::error("missing_required_field", "Missing field")
///     .with_path("mappings[0].column_transformations[1]")
///     .with_mapping("orders")
///     .with_extra("field", "data_type");
///
/// assert_eq!(diagnostic.severity(), Severity::Error);
/// assert_eq!(diagnostic.field(), Some("data_type"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    kind: String,

    message: String,

    severity: Severity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,

    #[serde(rename = "mapping", default, skip_serializing_if = "Option::is_none")]
    mapping_name: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Diagnostic {
    /// Creates a diagnostic with an explicit severity.
    pub fn new(kind: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            severity,
            path: None,
            mapping_name: None,
            extra: Map::new(),
        }
    }

    /// Creates a critical diagnostic.
    pub fn critical(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, message, Severity::Critical)
    }

    /// Creates an error diagnostic.
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, message, Severity::Error)
    }

    /// Creates a warning diagnostic.
    pub fn warning(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, message, Severity::Warning)
    }

    /// Creates an info diagnostic.
    pub fn info(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(kind, message, Severity::Info)
    }

    /// Sets the location of the finding.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the name of the mapping the finding belongs to.
    pub fn with_mapping(mut self, mapping_name: impl Into<String>) -> Self {
        self.mapping_name = Some(mapping_name.into());
        self
    }

    /// Sets the mapping name only if none is recorded yet.
    pub fn with_default_mapping(self, mapping_name: &str) -> Self {
        if self.mapping_name.is_some() {
            self
        } else {
            self.with_mapping(mapping_name)
        }
    }

    /// Overrides the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Adds an extra context value. Null values are dropped.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.extra.insert(key.into(), value);
        }
        self
    }

    /// Adds an extra context value when present.
    pub fn with_extra_opt<V: Into<Value>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_extra(key, value),
            None => self,
        }
    }

    /// Adds a `suggestion` extra.
    pub fn with_suggestion(self, suggestion: impl Into<String>) -> Self {
        self.with_extra("suggestion", suggestion.into())
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn mapping_name(&self) -> Option<&str> {
        self.mapping_name.as_deref()
    }

    /// Looks up an extra context value.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// All extra context values.
    pub fn extras(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// The `suggestion` extra, if it is a string.
    pub fn suggestion(&self) -> Option<&str> {
        self.extra.get("suggestion").and_then(Value::as_str)
    }

    /// The `field` extra, if it is a string.
    pub fn field(&self) -> Option<&str> {
        self.extra.get("field").and_then(Value::as_str)
    }

    /// Identity used for explicit deduplication.
    pub fn identity(&self) -> (&str, &str, &str) {
        (
            self.kind.as_str(),
            self.message.as_str(),
            self.path.as_deref().unwrap_or(""),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {}: {}", self.severity, path, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}
