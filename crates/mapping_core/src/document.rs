//! Helpers for reading the parsed configuration tree.
//!
//! A mapping job document is held as a [`serde_json::Value`]: the parser
//! crate decodes YAML or TOML into it, and every rule reads from it. The
//! expected shape is:
//!
//! ```text
//! settings?: { load?, environment?, default_partition_settings?: {..} }
//! mappings?: [
//!   { mapping_name, source_table, target_table,
//!     source_columns_interested?: [string],
//!     columns_mapping?: { source: target },
//!     column_duplications?: [ { source_column, additional_columns: [..] } ],
//!     column_transformations?: [
//!       { source_alias, target_column, data_type, transformation_type,
//!         transformations?: [ { type, parameters? } ] } ] } ]
//! ```

use serde_json::Value;

/// A parsed configuration document.
pub type Document = Value;

/// Short name of a node's type, used in diagnostic messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Returns true for integer or float numbers (booleans are not numbers).
pub fn is_number(value: &Value) -> bool {
    value.is_number()
}

/// Returns true for integral numbers.
pub fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

/// Renders a node for a human-readable message: strings verbatim, anything
/// else as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Name of a mapping for diagnostics, falling back to `mapping_{index}`.
pub fn mapping_label(mapping: &Value, index: usize) -> String {
    match mapping.get("mapping_name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) if !other.is_null() => render(other),
        _ => format!("mapping_{index}"),
    }
}

/// Name of a mapping when no positional fallback is available.
pub fn mapping_name_or_unknown(mapping: &Value) -> String {
    match mapping.get("mapping_name") {
        Some(Value::String(name)) => name.clone(),
        Some(other) if !other.is_null() => render(other),
        _ => "unknown".to_string(),
    }
}

/// The `mappings` list of a document, or an empty slice when absent or
/// not a list.
pub fn mappings(document: &Value) -> &[Value] {
    document
        .get("mappings")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// A list-valued field of a node, or an empty slice.
pub fn list_field<'a>(node: &'a Value, key: &str) -> &'a [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// A string-valued field of a node.
pub fn str_field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&json!(null)), "null");
        assert_eq!(type_name(&json!(true)), "boolean");
        assert_eq!(type_name(&json!(3)), "integer");
        assert_eq!(type_name(&json!(3.5)), "float");
        assert_eq!(type_name(&json!("x")), "string");
        assert_eq!(type_name(&json!([1])), "list");
        assert_eq!(type_name(&json!({"a": 1})), "map");
    }

    #[test]
    fn test_booleans_are_not_numbers() {
        assert!(!is_number(&json!(true)));
        assert!(is_number(&json!(0)));
        assert!(is_integer(&json!(-4)));
        assert!(!is_integer(&json!(4.5)));
    }

    #[test]
    fn test_mapping_label_fallback() {
        assert_eq!(mapping_label(&json!({"mapping_name": "orders"}), 3), "orders");
        assert_eq!(mapping_label(&json!({}), 3), "mapping_3");
        assert_eq!(mapping_label(&json!({"mapping_name": 42}), 0), "42");
        assert_eq!(mapping_name_or_unknown(&json!({})), "unknown");
    }

    #[test]
    fn test_mappings_tolerates_wrong_shapes() {
        assert!(mappings(&json!({})).is_empty());
        assert!(mappings(&json!({"mappings": "nope"})).is_empty());
        assert_eq!(mappings(&json!({"mappings": [{}, {}]})).len(), 2);
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&json!("abc")), "abc");
        assert_eq!(render(&json!(1.5)), "1.5");
        assert_eq!(render(&json!([1, 2])), "[1,2]");
    }
}
