use anyhow::{Context, Result};
use mapping_validator::{
    DEFAULT_EXTENSIONS, ValidationMode, ValidatorKind, summarize_directory, validate_directory,
};
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

pub fn execute(directory: &Path, mode: ValidationMode, format: OutputFormat) -> Result<()> {
    let kind = match mode {
        ValidationMode::Standard => ValidatorKind::Basic,
        ValidationMode::Comprehensive => ValidatorKind::Comprehensive,
        ValidationMode::SqlEnhanced => ValidatorKind::SqlEnhanced,
    };
    info!("Validating directory {} with {} validator", directory.display(), kind);

    let results = validate_directory(directory, &DEFAULT_EXTENSIONS, kind)
        .with_context(|| format!("Failed to validate directory: {}", directory.display()))?;

    if results.is_empty() && format == OutputFormat::Text {
        output::print_info("No configuration files found");
    }

    let summary = summarize_directory(&results);
    output::print_directory_summary(&summary, &results, format)?;

    if summary.invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}
