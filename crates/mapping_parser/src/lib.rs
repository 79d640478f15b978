//! Parser for data-mapping job configurations (YAML/TOML formats).
//!
//! This crate decodes configuration text into the document tree the
//! validators work on. It does not judge the content beyond the root shape;
//! [`check_structure`] offers a quick structural pass for callers that only
//! want to know whether a file looks like a job configuration.
//!
//! # Example
//!
//! ```rust
//! use mapping_parser::parse_yaml;
//!
//! let yaml = r#"
//! settings:
//!   load: full
//! mappings:
//!   - mapping_name: orders
//!     source_table: raw.orders
//!     target_table: dw.orders
//! "#;
//!
//! let document = parse_yaml(yaml).expect("Failed to parse job configuration");
//! assert_eq!(document["mappings"][0]["mapping_name"], "orders");
//! ```

use mapping_core::{Diagnostic, Document, ValidationResult, ValidationResultBuilder};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors that can occur while reading a configuration.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Input is empty or whitespace only
    #[error("Configuration content is empty or contains only whitespace")]
    EmptyContent,

    /// Root of the document is not a mapping
    #[error("Configuration must contain a mapping at root level, found {0}")]
    NotAMapping(&'static str),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse a job configuration from a YAML string.
///
/// A document that decodes to null (for instance only comments) becomes an
/// empty mapping.
///
/// # Example
///
/// ```rust
/// use mapping_parser::{parse_yaml, ParserError};
///
/// assert!(parse_yaml("# nothing here\n").unwrap().as_object().unwrap().is_empty());
/// assert!(matches!(parse_yaml("- a\n- b\n"), Err(ParserError::NotAMapping("list"))));
/// ```
pub fn parse_yaml(content: &str) -> Result<Document> {
    ensure_not_empty(content)?;
    let document: Value = serde_yaml_ng::from_str(content)?;
    into_root(document)
}

/// Parse a job configuration from a TOML string.
///
/// # Example
///
/// ```rust
/// use mapping_parser::parse_toml;
///
/// let toml = r#"
/// [settings]
/// load = "delta"
///
/// [[mappings]]
/// mapping_name = "orders"
/// "#;
///
/// let document = parse_toml(toml).unwrap();
/// assert_eq!(document["settings"]["load"], "delta");
/// ```
pub fn parse_toml(content: &str) -> Result<Document> {
    ensure_not_empty(content)?;
    let document: Value =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    into_root(document)
}

/// Detect the configuration format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `ConfigFormat::Yaml`
/// * `.toml` → `ConfigFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(ConfigFormat::Yaml),
        "toml" => Ok(ConfigFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Returns true when the path carries a YAML or TOML extension.
pub fn is_config_file(path: &Path) -> bool {
    detect_format(path).is_ok()
}

/// Parse a job configuration file with automatic format detection.
///
/// # Example
///
/// ```no_run
/// use mapping_parser::parse_file;
/// use std::path::Path;
///
/// let document = parse_file(Path::new("jobs/orders.yml")).unwrap();
/// println!("Loaded {} mappings", document["mappings"].as_array().map_or(0, Vec::len));
/// ```
pub fn parse_file(path: &Path) -> Result<Document> {
    let format = detect_format(path)?;
    debug!(path = %path.display(), "Parsing configuration file");

    let content = std::fs::read_to_string(path).inspect_err(|e| {
        error!(path = %path.display(), error = %e, "Could not read configuration file");
    })?;

    let parsed = match format {
        ConfigFormat::Yaml => parse_yaml(&content),
        ConfigFormat::Toml => parse_toml(&content),
    };
    if let Err(e) = &parsed {
        error!(path = %path.display(), error = %e, "Configuration parsing failed");
    }
    parsed
}

/// Basic structural check of a parsed document.
///
/// Reports a non-mapping root, an empty document, a `mappings` section
/// that is not a list or is empty, and a `settings` section that is not a
/// mapping. Nothing deeper is inspected.
pub fn check_structure(document: &Document) -> ValidationResult {
    let mut builder = ValidationResultBuilder::new();

    let Some(root) = document.as_object() else {
        builder.add_error(Diagnostic::critical(
            "invalid_yaml_structure",
            "YAML content must be a dictionary at root level",
        ));
        return builder.build();
    };

    if root.is_empty() {
        builder.add_warning(Diagnostic::warning(
            "empty_yaml_content",
            "YAML file is empty or contains no configuration",
        ));
    }

    match root.get("mappings") {
        Some(Value::Array(mappings)) if mappings.is_empty() => {
            builder.add_warning(
                Diagnostic::warning("empty_mappings", "mappings section is empty")
                    .with_path("mappings"),
            );
        }
        Some(Value::Array(_)) | None => {}
        Some(_) => {
            builder.add_error(
                Diagnostic::error("invalid_mappings_structure", "mappings section must be a list")
                    .with_path("mappings"),
            );
        }
    }

    if let Some(settings) = root.get("settings")
        && !settings.is_object()
    {
        builder.add_error(
            Diagnostic::error(
                "invalid_settings_structure",
                "settings section must be a dictionary",
            )
            .with_path("settings"),
        );
    }

    let result = builder.build();
    debug!(valid = result.is_valid(), "Structure check completed");
    result
}

fn ensure_not_empty(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(ParserError::EmptyContent);
    }
    Ok(())
}

fn into_root(document: Value) -> Result<Document> {
    match document {
        Value::Object(_) => Ok(document),
        Value::Null => {
            warn!("Configuration contains no data");
            Ok(Value::Object(Map::new()))
        }
        other => Err(ParserError::NotAMapping(mapping_core::document::type_name(
            &other,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_valid_yaml_job() {
        let yaml = r#"
settings:
  load: full
  environment: prod
mappings:
  - mapping_name: orders
    source_table: raw.orders
    target_table: dw.orders
    source_columns_interested:
      - id as order_id
      - amount
    column_transformations:
      - source_alias: order_id
        target_column: order_id
        data_type: BIGINT
        transformation_type: direct_mapping
"#;

        let document = parse_yaml(yaml).expect("Failed to parse valid YAML");

        assert_eq!(document["settings"]["load"], "full");
        let mapping = &document["mappings"][0];
        assert_eq!(mapping["mapping_name"], "orders");
        assert_eq!(mapping["source_columns_interested"][0], "id as order_id");
        assert_eq!(
            mapping["column_transformations"][0]["data_type"],
            "BIGINT"
        );
    }

    #[test]
    fn test_parse_yaml_preserves_key_order() {
        let yaml = "zeta: 1\nalpha: 2\nmid: 3\n";
        let document = parse_yaml(yaml).unwrap();
        let keys: Vec<&String> = document.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let invalid_yaml = "mappings:\n  - mapping_name: [unclosed\n";

        let result = parse_yaml(invalid_yaml);
        assert!(matches!(result.unwrap_err(), ParserError::YamlError(_)));
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(matches!(parse_yaml(""), Err(ParserError::EmptyContent)));
        assert!(matches!(parse_yaml("   \n\t"), Err(ParserError::EmptyContent)));
        assert!(matches!(parse_toml("\n"), Err(ParserError::EmptyContent)));
    }

    #[test]
    fn test_parse_null_document_is_empty_map() {
        let document = parse_yaml("~\n").unwrap();
        assert_eq!(document, Value::Object(Map::new()));
    }

    #[test]
    fn test_parse_scalar_root_is_rejected() {
        let result = parse_yaml("just a string\n");
        assert!(matches!(result, Err(ParserError::NotAMapping("string"))));
    }

    #[test]
    fn test_parse_valid_toml() {
        let toml = r#"
[settings]
load = "delta"

[[mappings]]
mapping_name = "orders"
source_columns_interested = ["id as rid"]

[[mappings.column_transformations]]
source_alias = "rid"
target_column = "rid"
data_type = "INTEGER"
transformation_type = "direct_mapping"
"#;

        let document = parse_toml(toml).expect("Failed to parse valid TOML");
        assert_eq!(document["settings"]["load"], "delta");
        assert_eq!(
            document["mappings"][0]["column_transformations"][0]["source_alias"],
            "rid"
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        let invalid_toml = "name = \"test\"\n[[[invalid syntax\n";

        let result = parse_toml(invalid_toml);
        assert!(matches!(result.unwrap_err(), ParserError::TomlError(_)));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("job.yaml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(detect_format(Path::new("job.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(detect_format(Path::new("job.toml")).unwrap(), ConfigFormat::Toml);
        assert!(matches!(
            detect_format(Path::new("job.json")).unwrap_err(),
            ParserError::UnsupportedFormat(_)
        ));
        assert!(matches!(
            detect_format(Path::new("job")).unwrap_err(),
            ParserError::InvalidExtension
        ));
    }

    #[test]
    fn test_is_config_file() {
        assert!(is_config_file(Path::new("a/b/job.yml")));
        assert!(!is_config_file(Path::new("README.md")));
    }

    #[test]
    fn test_parse_file_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "mappings:\n  - mapping_name: orders").unwrap();

        let document = parse_file(file.path()).unwrap();
        assert_eq!(document["mappings"][0]["mapping_name"], "orders");
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(Path::new("/definitely/not/here.yml"));
        assert!(matches!(result.unwrap_err(), ParserError::IoError(_)));
    }

    #[test]
    fn test_check_structure() {
        let ok = parse_yaml("mappings:\n  - mapping_name: a\n").unwrap();
        assert!(check_structure(&ok).is_valid());

        let empty = parse_yaml("mappings: []\n").unwrap();
        let result = check_structure(&empty);
        assert!(result.is_valid());
        assert_eq!(result.warnings()[0].kind(), "empty_mappings");

        let bad = parse_yaml("mappings: nope\nsettings: [1]\n").unwrap();
        let result = check_structure(&bad);
        assert_eq!(
            result.error_types(),
            vec!["invalid_mappings_structure", "invalid_settings_structure"]
        );

        let result = check_structure(&Value::Array(vec![]));
        assert_eq!(result.errors()[0].kind(), "invalid_yaml_structure");
        assert_eq!(
            result.errors()[0].severity(),
            mapping_core::Severity::Critical
        );

        let result = check_structure(&Value::Object(Map::new()));
        assert_eq!(result.warning_types(), vec!["empty_yaml_content"]);
    }
}
