//! Scope descriptor threaded through rule application.

/// Where in the document a rule is currently looking.
///
/// Contexts are values: [`child`](Self::child) and the `with_*` methods
/// return a new context and leave the original untouched, so one parent can
/// be reused across sibling iterations.
///
/// # Example
///
/// ```rust
/// use mapping_core::ValidationContext;
///
/// let root = ValidationContext::new("mappings[2]").with_mapping("orders");
/// let op = root.with_transformation(0).with_operation(1);
///
/// assert_eq!(op.path(), "mappings[2].column_transformations[0].transformations[1]");
/// assert_eq!(root.path(), "mappings[2]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Dotted prefix of every produced path
    pub base_path: String,

    /// Mapping being validated, if any
    pub mapping_name: Option<String>,

    /// Index into `column_transformations`
    pub transformation_index: Option<usize>,

    /// Index into the transformation's `transformations` list
    pub operation_index: Option<usize>,
}

impl ValidationContext {
    /// Creates a context rooted at `base_path`.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Default::default()
        }
    }

    /// The document root.
    pub fn root() -> Self {
        Self::new("root")
    }

    /// Full path of the current scope.
    pub fn path(&self) -> String {
        self.path_with("")
    }

    /// Full path of the current scope with `additional` appended.
    pub fn path_with(&self, additional: &str) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if !self.base_path.is_empty() {
            parts.push(self.base_path.clone());
        }
        if let Some(i) = self.transformation_index {
            parts.push(format!("column_transformations[{i}]"));
        }
        if let Some(j) = self.operation_index {
            parts.push(format!("transformations[{j}]"));
        }
        if !additional.is_empty() {
            parts.push(additional.to_string());
        }
        parts.join(".")
    }

    /// Returns a copy of this context.
    pub fn child(&self) -> Self {
        self.clone()
    }

    pub fn with_base_path(&self, base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..self.clone()
        }
    }

    pub fn with_mapping(&self, mapping_name: impl Into<String>) -> Self {
        Self {
            mapping_name: Some(mapping_name.into()),
            ..self.clone()
        }
    }

    pub fn with_transformation(&self, index: usize) -> Self {
        Self {
            transformation_index: Some(index),
            ..self.clone()
        }
    }

    pub fn with_operation(&self, index: usize) -> Self {
        Self {
            operation_index: Some(index),
            ..self.clone()
        }
    }

    /// Mapping name or `"unknown"`.
    pub fn mapping_or_unknown(&self) -> &str {
        self.mapping_name.as_deref().unwrap_or("unknown")
    }
}
