//! Catalog of transformation operations and their parameter contracts.
//!
//! Every step of a column transformation chain names an operation (`round`,
//! `replace`, `divide`, ...) and passes a parameter map. The
//! [`OperationRegistry`] knows each operation's parameters and checks a
//! `(name, parameters)` pair against them.
//!
//! Parameters frequently hold either a literal or the name of another column,
//! so [`ParameterType::ColumnReference`] and [`ParameterType::StringOrNumber`]
//! accept strings as well as numbers. Range checks only apply to numeric
//! values and choice checks skip strings when column references are allowed.

use mapping_core::Diagnostic;
use mapping_core::document::{render, type_name};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Declared type of an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Integer,
    Float,
    /// Integer or float
    Number,
    Boolean,
    List,
    Map,
    /// One of a fixed set of values
    Choice,
    StringOrNumber,
    /// A literal number or the name of another column
    ColumnReference,
    SqlExpression,
}

impl ParameterType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Map => "map",
            Self::Choice => "choice",
            Self::StringOrNumber => "string_or_number",
            Self::ColumnReference => "column_reference",
            Self::SqlExpression => "sql_expression",
        }
    }

    /// Types whose numeric values are subject to range checks.
    fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Float
                | Self::Number
                | Self::StringOrNumber
                | Self::ColumnReference
        )
    }

    /// Returns `(expected_type, wording)` when `value` does not fit this type.
    fn mismatch(self, value: &Value) -> Option<(&'static str, &'static str)> {
        let (accepted, expected, wording) = match self {
            Self::Integer => (value.is_i64() || value.is_u64(), "integer", "integer"),
            Self::Float | Self::Number => (value.is_number(), "number", "number"),
            Self::String => (value.is_string(), "string", "string"),
            Self::StringOrNumber => (
                value.is_string() || value.is_number(),
                "string_or_number",
                "string or number",
            ),
            Self::ColumnReference => (
                value.is_string() || value.is_number(),
                "column_reference_or_number",
                "string (column reference) or number",
            ),
            Self::Boolean => (value.is_boolean(), "boolean", "boolean"),
            Self::List => (value.is_array(), "list", "list"),
            Self::Map => (value.is_object(), "map", "map"),
            Self::SqlExpression => (
                value.is_string(),
                "sql_expression",
                "string (SQL expression)",
            ),
            Self::Choice => (true, "choice", "choice"),
        };
        (!accepted).then_some((expected, wording))
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra check run after the built-in ones: `(value, path, parameter_name)`.
///
/// An `Err` is reported as `parameter_validation_error`.
pub type ParameterCheck = fn(&Value, &str, &str) -> Result<Vec<Diagnostic>, String>;

/// Contract for one parameter of an operation.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParameterType,
    pub required: bool,
    pub default: Option<Value>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub choices: Vec<Value>,
    pub description: String,
    pub check: Option<ParameterCheck>,
    /// Strings may name a column, so they skip choice checks
    pub allow_column_references: bool,
    pub allow_sql_expressions: bool,
}

impl ParameterSpec {
    /// Creates an optional parameter with no default.
    pub fn new(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            default: None,
            min_value: None,
            max_value: None,
            choices: Vec::new(),
            description: String::new(),
            check: None,
            allow_column_references: false,
            allow_sql_expressions: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn check(mut self, check: ParameterCheck) -> Self {
        self.check = Some(check);
        self
    }

    pub fn column_references(mut self) -> Self {
        self.allow_column_references = true;
        self
    }

    pub fn sql_expressions(mut self) -> Self {
        self.allow_sql_expressions = true;
        self
    }

    /// Validates one parameter value. A `null` value counts as missing.
    ///
    /// A missing required parameter and a type mismatch are both terminal;
    /// otherwise range, choice and custom checks all run.
    pub fn validate(&self, value: Option<&Value>, path: &str) -> Vec<Diagnostic> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            if self.required {
                return vec![
                    Diagnostic::error(
                        "missing_required_parameter",
                        format!("{}: required parameter is missing", self.name),
                    )
                    .with_path(path)
                    .with_extra("parameter", self.name.as_str()),
                ];
            }
            return Vec::new();
        };

        let mut diagnostics = Vec::new();

        if let Some((expected, wording)) = self.param_type.mismatch(value) {
            diagnostics.push(
                Diagnostic::error(
                    "invalid_parameter_type",
                    format!("{}: must be {wording}, got {}", self.name, type_name(value)),
                )
                .with_path(path)
                .with_extra("parameter", self.name.as_str())
                .with_extra("expected_type", expected)
                .with_extra("actual_type", type_name(value)),
            );
            return diagnostics;
        }

        if self.param_type.is_numeric()
            && let Some(number) = value.as_f64()
        {
            if let Some(min) = self.min_value
                && number < min
            {
                diagnostics.push(
                    Diagnostic::error(
                        "parameter_below_minimum",
                        format!("{}: must be >= {min}, got {}", self.name, render(value)),
                    )
                    .with_path(path)
                    .with_extra("parameter", self.name.as_str())
                    .with_extra("min_value", bound_value(min))
                    .with_extra("actual_value", value.clone()),
                );
            }
            if let Some(max) = self.max_value
                && number > max
            {
                diagnostics.push(
                    Diagnostic::error(
                        "parameter_above_maximum",
                        format!("{}: must be <= {max}, got {}", self.name, render(value)),
                    )
                    .with_path(path)
                    .with_extra("parameter", self.name.as_str())
                    .with_extra("max_value", bound_value(max))
                    .with_extra("actual_value", value.clone()),
                );
            }
        }

        let column_reference = value.is_string() && self.allow_column_references;
        if !self.choices.is_empty() && !column_reference && !self.choices.contains(value) {
            diagnostics.push(
                Diagnostic::error(
                    "invalid_parameter_choice",
                    format!(
                        "{}: must be one of {}, got {}",
                        self.name,
                        render_list(&self.choices),
                        render(value)
                    ),
                )
                .with_path(path)
                .with_extra("parameter", self.name.as_str())
                .with_extra("valid_choices", self.choices.clone())
                .with_extra("actual_value", value.clone()),
            );
        }

        if let Some(check) = self.check {
            match check(value, path, &self.name) {
                Ok(found) => diagnostics.extend(found),
                Err(e) => diagnostics.push(
                    Diagnostic::error(
                        "parameter_validation_error",
                        format!("{}: validation error - {e}", self.name),
                    )
                    .with_path(path)
                    .with_extra("parameter", self.name.as_str())
                    .with_extra("exception", e),
                ),
            }
        }

        diagnostics
    }

    fn help(&self) -> ParameterHelp {
        ParameterHelp {
            name: self.name.clone(),
            param_type: self.param_type,
            required: self.required,
            default: self.default.clone(),
            description: self.description.clone(),
            min_value: self.min_value.map(bound_value),
            max_value: self.max_value.map(bound_value),
            choices: (!self.choices.is_empty()).then(|| self.choices.clone()),
        }
    }
}

/// Contract for one operation.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub name: String,
    pub category: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    pub examples: Vec<Value>,
}

impl OperationSpec {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
            parameters: Vec::new(),
            examples: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.examples.push(example);
        self
    }

    /// Looks up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.required)
    }

    pub fn optional_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| !p.required)
    }

    /// Validates a whole parameter map: unknown keys first, then every
    /// declared parameter. Never stops at the first failure.
    pub fn validate_parameters(&self, parameters: &Map<String, Value>, path: &str) -> Vec<Diagnostic> {
        let valid: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();

        let mut diagnostics: Vec<Diagnostic> = parameters
            .keys()
            .filter(|key| !valid.contains(&key.as_str()))
            .map(|key| {
                Diagnostic::error(
                    "unknown_parameter",
                    format!("{}: unknown parameter \"{key}\"", self.name),
                )
                .with_path(path)
                .with_extra("operation", self.name.as_str())
                .with_extra("parameter", key.as_str())
                .with_extra("valid_parameters", valid.clone())
            })
            .collect();

        for spec in &self.parameters {
            diagnostics.extend(spec.validate(parameters.get(&spec.name), path));
        }

        diagnostics
    }
}

/// Parameter description returned by [`OperationRegistry::help`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterHelp {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub required: bool,
    pub default: Option<Value>,
    pub description: String,
    pub min_value: Option<Value>,
    pub max_value: Option<Value>,
    pub choices: Option<Vec<Value>>,
}

/// Operation description returned by [`OperationRegistry::help`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationHelp {
    pub name: String,
    pub category: String,
    pub description: String,
    pub parameters: Vec<ParameterHelp>,
    pub examples: Vec<Value>,
}

static SHARED_REGISTRY: LazyLock<Arc<OperationRegistry>> =
    LazyLock::new(|| Arc::new(OperationRegistry::builtin()));

/// Catalog of operations keyed by name and grouped by category.
///
/// Lookups by name and by category are hash lookups. The registry is
/// read-only once validators hold it: [`register`](Self::register) needs
/// `&mut self`, so new operations can only be added before the registry is
/// wrapped in an `Arc` and shared.
///
/// # Example
///
/// ```rust
/// use mapping_validator::OperationRegistry;
/// use serde_json::{Map, json};
///
/// let registry = OperationRegistry::shared();
/// let mut params = Map::new();
/// params.insert("factor".into(), json!(0));
///
/// let diagnostics = registry.validate_operation("divide", &params, "ops[0]");
/// assert_eq!(diagnostics[0].kind(), "division_by_zero");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<String, OperationSpec>,
    names: Vec<String>,
    categories: HashMap<String, Vec<String>>,
    category_order: Vec<String>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in operation catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in string_operations()
            .into_iter()
            .chain(numeric_operations())
            .chain(datetime_operations())
            .chain(conditional_operations())
            .chain(conversion_operations())
        {
            registry.register(spec);
        }
        registry
    }

    /// The process-wide built-in registry, initialized on first use.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_REGISTRY)
    }

    /// Adds an operation, replacing any existing spec with the same name.
    ///
    /// A replaced operation keeps its position in [`operation_names`](Self::operation_names).
    pub fn register(&mut self, spec: OperationSpec) {
        let name = spec.name.clone();
        let category = spec.category.clone();

        match self.operations.insert(name.clone(), spec) {
            Some(previous) if previous.category == category => return,
            Some(previous) => {
                if let Some(members) = self.categories.get_mut(&previous.category) {
                    members.retain(|n| n != &name);
                    if members.is_empty() {
                        self.categories.remove(&previous.category);
                        self.category_order.retain(|c| c != &previous.category);
                    }
                }
            }
            None => self.names.push(name.clone()),
        }

        let members = self.categories.entry(category.clone()).or_insert_with(|| {
            self.category_order.push(category);
            Vec::new()
        });
        members.push(name);
    }

    pub fn get(&self, name: &str) -> Option<&OperationSpec> {
        self.operations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Operation names in registration order.
    pub fn operation_names(&self) -> &[String] {
        &self.names
    }

    /// Operation names of one category, empty for unknown categories.
    pub fn operations_by_category(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories in first-registration order.
    pub fn categories(&self) -> &[String] {
        &self.category_order
    }

    /// Validates one operation step.
    ///
    /// An unknown name yields exactly one `invalid_operation_type`
    /// diagnostic. A known name yields the union of its parameter
    /// diagnostics plus the cross-parameter checks of `clamp`.
    pub fn validate_operation(
        &self,
        name: &str,
        parameters: &Map<String, Value>,
        path: &str,
    ) -> Vec<Diagnostic> {
        let Some(spec) = self.get(name) else {
            return vec![
                Diagnostic::error(
                    "invalid_operation_type",
                    format!("Invalid operation type \"{name}\""),
                )
                .with_path(path)
                .with_extra("invalid_value", name)
                .with_extra("valid_values", self.names.clone()),
            ];
        };

        let mut diagnostics = spec.validate_parameters(parameters, path);
        if name == "clamp" {
            diagnostics.extend(clamp_bounds(parameters, path));
        }
        diagnostics
    }

    /// Names starting with `partial`, then names containing it,
    /// case-insensitively, at most `max` of them.
    pub fn suggestions(&self, partial: &str, max: usize) -> Vec<&str> {
        if partial.is_empty() {
            return Vec::new();
        }
        let needle = partial.to_lowercase();

        let mut found: Vec<&str> = self
            .names
            .iter()
            .filter(|n| n.to_lowercase().starts_with(&needle))
            .map(String::as_str)
            .collect();

        for name in &self.names {
            if found.len() >= max {
                break;
            }
            if name.to_lowercase().contains(&needle) && !found.contains(&name.as_str()) {
                found.push(name);
            }
        }

        found.truncate(max);
        found
    }

    pub fn help(&self, name: &str) -> Option<OperationHelp> {
        let spec = self.get(name)?;
        Some(OperationHelp {
            name: spec.name.clone(),
            category: spec.category.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.iter().map(ParameterSpec::help).collect(),
            examples: spec.examples.clone(),
        })
    }
}

fn clamp_bounds(parameters: &Map<String, Value>, path: &str) -> Option<Diagnostic> {
    let present = |key: &str| parameters.get(key).filter(|v| !v.is_null());
    let (min, max) = (present("min_value"), present("max_value"));

    match (min, max) {
        (None, None) => Some(
            Diagnostic::error(
                "missing_clamp_bounds",
                "clamp: requires at least \"min_value\" or \"max_value\" parameter",
            )
            .with_path(path)
            .with_extra("operation", "clamp"),
        ),
        (Some(lo), Some(hi)) => match (lo.as_f64(), hi.as_f64()) {
            (Some(a), Some(b)) if a > b => Some(
                Diagnostic::error(
                    "invalid_clamp_range",
                    format!(
                        "clamp: min_value ({}) cannot exceed max_value ({})",
                        render(lo),
                        render(hi)
                    ),
                )
                .with_path(path)
                .with_extra("operation", "clamp")
                .with_extra("min_value", lo.clone())
                .with_extra("max_value", hi.clone()),
            ),
            _ => None,
        },
        _ => None,
    }
}

fn non_zero_divisor(value: &Value, path: &str, name: &str) -> Result<Vec<Diagnostic>, String> {
    if value.as_f64() == Some(0.0) {
        return Ok(vec![
            Diagnostic::error(
                "division_by_zero",
                "divide: factor cannot be zero (division by zero)",
            )
            .with_path(path)
            .with_extra("parameter", name),
        ]);
    }
    Ok(Vec::new())
}

/// Renders a numeric bound as an integer when it has no fractional part.
fn bound_value(bound: f64) -> Value {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        json!(bound as i64)
    } else {
        json!(bound)
    }
}

fn render_list(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(render).collect();
    format!("[{}]", items.join(", "))
}

const ROUNDING_MODES: [&str; 7] = [
    "HALF_UP",
    "HALF_DOWN",
    "HALF_EVEN",
    "UP",
    "DOWN",
    "CEILING",
    "FLOOR",
];

fn string_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            "trim",
            "string",
            "Remove whitespace from beginning and end of string",
        )
        .with_example(json!({"type": "trim"})),
        OperationSpec::new("lowercase", "string", "Convert string to lowercase"),
        OperationSpec::new("uppercase", "string", "Convert string to uppercase"),
        OperationSpec::new(
            "replace",
            "string",
            "Replace occurrences of search string with replacement",
        )
        .with_parameter(
            ParameterSpec::new("search", ParameterType::String)
                .required()
                .description("String to search for"),
        )
        .with_parameter(
            ParameterSpec::new("replacement", ParameterType::String)
                .required()
                .description("Replacement string"),
        )
        .with_parameter(
            ParameterSpec::new("case_sensitive", ParameterType::Boolean)
                .default_value(true)
                .description("Whether search is case sensitive"),
        )
        .with_example(json!({
            "type": "replace",
            "parameters": {"search": "-", "replacement": ""}
        })),
    ]
}

fn numeric_operations() -> Vec<OperationSpec> {
    let arithmetic = |name: &str, description: &str, param: &str, param_description: &str| {
        OperationSpec::new(name, "numeric", description).with_parameter(
            ParameterSpec::new(param, ParameterType::ColumnReference)
                .required()
                .column_references()
                .description(param_description),
        )
    };
    let precision = || {
        ParameterSpec::new("precision", ParameterType::Integer)
            .default_value(0)
            .min(0.0)
            .description("Decimal places for precision")
    };

    vec![
        OperationSpec::new("round", "numeric", "Round number to specified precision")
            .with_parameter(
                ParameterSpec::new("precision", ParameterType::Integer)
                    .default_value(0)
                    .min(0.0)
                    .max(15.0)
                    .description("Number of decimal places"),
            )
            .with_parameter(
                ParameterSpec::new("mode", ParameterType::Choice)
                    .default_value("HALF_UP")
                    .choices(ROUNDING_MODES)
                    .description("Rounding mode"),
            )
            .with_example(json!({"type": "round", "parameters": {"precision": 2}})),
        arithmetic(
            "add",
            "Add a value to the number",
            "value",
            "Value to add (can be number or column reference)",
        ),
        arithmetic(
            "subtract",
            "Subtract a value from the number",
            "value",
            "Value to subtract (can be number or column reference)",
        ),
        arithmetic(
            "multiply",
            "Multiply the number by a factor",
            "factor",
            "Multiplication factor (can be number or column reference)",
        )
        .with_example(json!({"type": "multiply", "parameters": {"factor": 100}})),
        OperationSpec::new("divide", "numeric", "Divide the number by a factor")
            .with_parameter(
                ParameterSpec::new("factor", ParameterType::ColumnReference)
                    .required()
                    .column_references()
                    .check(non_zero_divisor)
                    .description("Division factor (can be number or column reference)"),
            )
            .with_example(json!({"type": "divide", "parameters": {"factor": "exchange_rate"}})),
        OperationSpec::new("parse_currency", "numeric", "Parse currency value from string")
            .with_parameter(
                ParameterSpec::new("currency_symbol", ParameterType::String)
                    .description("Currency symbol to remove"),
            )
            .with_parameter(
                ParameterSpec::new("thousands_separator", ParameterType::String)
                    .default_value(",")
                    .description("Thousands separator character"),
            )
            .with_parameter(
                ParameterSpec::new("decimal_separator", ParameterType::String)
                    .default_value(".")
                    .description("Decimal separator character"),
            )
            .with_parameter(
                ParameterSpec::new("default_value", ParameterType::StringOrNumber)
                    .default_value(0.0)
                    .description("Default value if parsing fails (can be string or number)"),
            )
            .with_example(json!({
                "type": "parse_currency",
                "parameters": {"currency_symbol": "$"}
            })),
        OperationSpec::new("parse_number", "numeric", "Parse number from string")
            .with_parameter(
                ParameterSpec::new("default_value", ParameterType::StringOrNumber)
                    .default_value(0)
                    .description("Default value if parsing fails (can be string or number)"),
            )
            .with_parameter(
                ParameterSpec::new("base", ParameterType::Integer)
                    .default_value(10)
                    .min(2.0)
                    .max(36.0)
                    .description("Number base for parsing (2-36)"),
            )
            .with_parameter(
                ParameterSpec::new("number_type", ParameterType::Choice)
                    .default_value("auto")
                    .choices(["auto", "integer", "float", "decimal"])
                    .description("Target number type"),
            ),
        OperationSpec::new(
            "ceil",
            "numeric",
            "Round up to next integer or specified precision",
        )
        .with_parameter(precision()),
        OperationSpec::new(
            "floor",
            "numeric",
            "Round down to previous integer or specified precision",
        )
        .with_parameter(precision()),
        arithmetic(
            "min_value",
            "Ensure minimum value",
            "min_value",
            "Minimum allowed value (can be number or column reference)",
        ),
        arithmetic(
            "max_value",
            "Ensure maximum value",
            "max_value",
            "Maximum allowed value (can be number or column reference)",
        ),
        OperationSpec::new("clamp", "numeric", "Constrain value to a range")
            .with_parameter(
                ParameterSpec::new("min_value", ParameterType::ColumnReference)
                    .column_references()
                    .description("Minimum value (can be number or column reference)"),
            )
            .with_parameter(
                ParameterSpec::new("max_value", ParameterType::ColumnReference)
                    .column_references()
                    .description("Maximum value (can be number or column reference)"),
            )
            .with_example(json!({
                "type": "clamp",
                "parameters": {"min_value": 0, "max_value": 100}
            })),
    ]
}

fn datetime_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new("format_date", "datetime", "Format date according to pattern")
            .with_parameter(
                ParameterSpec::new("format_pattern", ParameterType::String)
                    .required()
                    .description("Date format pattern (e.g., YYYY-MM-DD)"),
            )
            .with_parameter(
                ParameterSpec::new("input_format", ParameterType::String)
                    .description("Input date format if different from default"),
            )
            .with_example(json!({
                "type": "format_date",
                "parameters": {"format_pattern": "YYYY-MM-DD"}
            })),
    ]
}

fn conditional_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new(
            "case_when",
            "conditional",
            "Conditional value assignment based on conditions",
        )
        .with_parameter(
            ParameterSpec::new("conditions", ParameterType::List)
                .required()
                .description("List of condition-value pairs"),
        )
        .with_parameter(
            ParameterSpec::new("default_value", ParameterType::StringOrNumber)
                .description("Default value if no conditions match (can be string or number)"),
        ),
    ]
}

fn conversion_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new("string_to_number", "conversion", "Convert string to number")
            .with_parameter(
                ParameterSpec::new("number_type", ParameterType::Choice)
                    .default_value("decimal")
                    .choices(["integer", "decimal", "float"])
                    .description("Target number type"),
            )
            .with_parameter(
                ParameterSpec::new("default_value", ParameterType::StringOrNumber)
                    .default_value(0)
                    .description("Default value if conversion fails (can be string or number)"),
            ),
        OperationSpec::new("sql_expression", "advanced", "Execute custom SQL expression")
            .with_parameter(
                ParameterSpec::new("expression", ParameterType::SqlExpression)
                    .required()
                    .sql_expressions()
                    .description("SQL expression to execute"),
            )
            .with_parameter(
                ParameterSpec::new("column_references", ParameterType::List)
                    .description("List of column names referenced in expression"),
            ),
    ]
}
