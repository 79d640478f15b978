mod commands;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logging::LogProfile;
use mapping_core::Severity;
use mapping_validator::ValidationMode;
use output::OutputFormat;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "mcv")]
#[command(version, about = "Mapping configuration validator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Logging preset (MCV_LOG or RUST_LOG override it)
    #[arg(long, global = true, value_enum, default_value = "standalone")]
    log_profile: LogProfile,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a job configuration
    Validate {
        /// Path to the job configuration (YAML or TOML)
        file: PathBuf,

        /// Validation mode: standard, comprehensive, sql-enhanced
        #[arg(short, long, default_value = "comprehensive", value_parser = ValidationMode::from_str)]
        mode: ValidationMode,

        /// Output format: text, json, compact
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Hide diagnostics below this severity
        #[arg(long, default_value = "info", value_parser = Severity::from_str)]
        min_severity: Severity,
    },

    /// Check the document structure without running any rules
    Check {
        /// Path to the job configuration (YAML or TOML)
        file: PathBuf,

        /// Output format: text, json, compact
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the job validator and print its summary and consistency score
    Job {
        /// Path to the job configuration (YAML or TOML)
        file: PathBuf,

        /// Include SQL expression checks
        #[arg(long)]
        sql: bool,

        /// Output format: text, json, compact
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Browse the transformation operation catalog
    Ops {
        /// Show help for one operation
        name: Option<String>,

        /// Only list operations of this category
        #[arg(short, long)]
        category: Option<String>,

        /// Suggest operation names matching a partial name
        #[arg(short, long)]
        suggest: Option<String>,
    },

    /// Validate every configuration file in a directory
    Dir {
        /// Directory to scan (not recursive)
        directory: PathBuf,

        /// Validation mode: standard, comprehensive, sql-enhanced
        #[arg(short, long, default_value = "comprehensive", value_parser = ValidationMode::from_str)]
        mode: ValidationMode,

        /// Output format: text, json, compact
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_profile, cli.verbose);

    match cli.command {
        Commands::Validate {
            file,
            mode,
            format,
            min_severity,
        } => commands::validate::execute(&file, mode, format, min_severity),

        Commands::Check { file, format } => commands::check::execute(&file, format),

        Commands::Job { file, sql, format } => commands::job::execute(&file, sql, format),

        Commands::Ops {
            name,
            category,
            suggest,
        } => commands::ops::execute(name.as_deref(), category.as_deref(), suggest.as_deref()),

        Commands::Dir {
            directory,
            mode,
            format,
        } => commands::dir::execute(&directory, mode, format),
    }
}
