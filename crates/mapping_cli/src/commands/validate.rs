use anyhow::{Context, Result};
use mapping_core::Severity;
use mapping_core::document::mappings;
use mapping_parser::parse_file;
use mapping_validator::{JobValidator, ValidationMode};
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

pub fn execute(
    path: &Path,
    mode: ValidationMode,
    format: OutputFormat,
    min_severity: Severity,
) -> Result<()> {
    info!("Validating job configuration: {}", path.display());
    info!("Validation mode: {}", mode);

    let document = parse_file(path)
        .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

    if format == OutputFormat::Text {
        output::print_info(&format!(
            "Configuration loaded: {} mappings ({})",
            mappings(&document).len(),
            mode.scope()
        ));
    }

    let mut validator = JobValidator::new(mode);
    let result = validator.validate(&document);

    // Filtering re-buckets by severity, so validity is always taken from the
    // unfiltered result.
    if min_severity > Severity::Info {
        output::print_validation_result(&result.filter_by_severity(min_severity), format)?;
    } else {
        output::print_validation_result(&result, format)?;
    }

    if !result.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}
