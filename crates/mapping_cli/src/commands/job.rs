use anyhow::{Context, Result};
use mapping_parser::parse_file;
use mapping_validator::{JobValidator, ValidationMode, compact_summary, detailed_summary};
use std::path::Path;
use tracing::info;

use crate::output::{self, OutputFormat};

pub fn execute(path: &Path, sql: bool, format: OutputFormat) -> Result<()> {
    let mode = if sql {
        ValidationMode::SqlEnhanced
    } else {
        ValidationMode::Comprehensive
    };
    info!("Running job validation on {} ({})", path.display(), mode);

    let document = parse_file(path)
        .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

    let mut validator = JobValidator::new(mode);
    let valid = match format {
        OutputFormat::Json => {
            let report = validator.validation_report(&document);
            output::print_json(&report)?;
            report.overall_status == "valid"
        }
        OutputFormat::Compact => {
            let result = validator.validate(&document);
            println!("{}", compact_summary(&result));
            result.is_valid()
        }
        OutputFormat::Text => {
            let (valid, message) = validator.validate_job_configuration(&document);
            if valid {
                output::print_success(&message);
            } else {
                output::print_error(&message);
            }

            println!("\n{}", validator.validation_summary(&document));

            let result = validator.run(&document);
            if !valid {
                println!("\n{}", detailed_summary(&result, true));
            }
            output::print_consistency(&JobValidator::consistency_score(&result));
            valid
        }
    };

    if !valid {
        std::process::exit(1);
    }

    Ok(())
}
