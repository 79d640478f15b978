use anyhow::{Context, Result};
use mapping_core::document::{mapping_label, mappings, str_field};
use mapping_parser::{check_structure, detect_format, parse_file};
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

pub fn execute(path: &Path, format: OutputFormat) -> Result<()> {
    info!("Checking configuration structure: {}", path.display());

    let config_format = detect_format(path)
        .with_context(|| format!("Unsupported configuration file: {}", path.display()))?;
    let document = parse_file(path)
        .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

    let result = check_structure(&document);
    if format != OutputFormat::Text {
        output::print_validation_result(&result, format)?;
    } else if result.is_valid() {
        output::print_success("Configuration structure is valid");
    } else {
        for diagnostic in result.errors() {
            output::print_error(&format!("[{}] {}", diagnostic.kind(), diagnostic.message()));
        }
    }

    if format == OutputFormat::Text {
        for diagnostic in result.warnings() {
            output::print_info(diagnostic.message());
        }

        println!("\nConfiguration Summary:");
        println!("  File:        {}", path.display());
        println!("  Format:      {config_format:?}");
        let settings = document.get("settings");
        println!(
            "  Load:        {}",
            settings.and_then(|s| str_field(s, "load")).unwrap_or("N/A")
        );
        println!(
            "  Environment: {}",
            settings
                .and_then(|s| str_field(s, "environment"))
                .unwrap_or("N/A")
        );

        let all = mappings(&document);
        println!("  Mappings:    {}", all.len());
        for (i, mapping) in all.iter().enumerate() {
            let transformations = mapping
                .get("column_transformations")
                .and_then(|t| t.as_array())
                .map_or(0, Vec::len);
            println!(
                "    - {} ({transformations} transformations)",
                mapping_label(mapping, i)
            );
        }
    }

    if !result.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}
