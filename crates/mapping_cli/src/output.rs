use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use mapping_core::{Diagnostic, Severity, ValidationResult};
use mapping_validator::{ConsistencyAnalysis, DirectorySummary, compact_summary};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Compact,
}

const SHOWN_SUGGESTIONS: usize = 5;

pub fn print_validation_result(result: &ValidationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", result.to_json()?),
        OutputFormat::Compact => println!("{}", compact_summary(result)),
        OutputFormat::Text => print_text_result(result),
    }
    Ok(())
}

fn print_text_result(result: &ValidationResult) {
    print_header("VALIDATION REPORT");

    if result.is_valid() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !result.errors().is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for (i, diagnostic) in result.errors().iter().enumerate() {
            println!("  {}. {}", i + 1, describe(diagnostic));
        }
    }

    if !result.warnings().is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for (i, diagnostic) in result.warnings().iter().enumerate() {
            println!("  {}. {}", i + 1, describe(diagnostic));
        }
    }

    let suggestions = result.suggestions();
    if !suggestions.is_empty() {
        println!("\n{}", "Suggestions:".cyan().bold());
        for suggestion in suggestions.iter().take(SHOWN_SUGGESTIONS) {
            println!("  * {suggestion}");
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Total errors:   {}", result.errors().len());
    println!("  Total warnings: {}", result.warnings().len());
    println!("  Total info:     {}", result.info().len());
    let affected = result.affected_mappings();
    if !affected.is_empty() {
        println!(
            "  Mappings:       {}",
            affected.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    println!("{}", "═".repeat(60));
}

pub fn print_consistency(analysis: &ConsistencyAnalysis) {
    let score = format!("{}/100", analysis.score);
    let score = match analysis.score {
        90.. => score.green(),
        60..=89 => score.yellow(),
        _ => score.red(),
    };
    println!("\n{} {}", "Consistency score:".bold(), score.bold());
    for (kind, count) in &analysis.error_breakdown {
        if *count > 0 {
            println!("  - {kind}: {count}");
        }
    }
}

pub fn print_directory_summary(
    summary: &DirectorySummary,
    results: &BTreeMap<PathBuf, ValidationResult>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let files: BTreeMap<String, serde_json::Value> = results
                .iter()
                .map(|(path, result)| (path.display().to_string(), result.to_report()))
                .collect();
            print_json(&serde_json::json!({ "summary": summary, "files": files }))?;
        }
        OutputFormat::Compact => {
            for (path, result) in results {
                println!("{}: {}", path.display(), compact_summary(result));
            }
        }
        OutputFormat::Text => {
            print_header("DIRECTORY VALIDATION");
            for (path, result) in results {
                let mark = if result.is_valid() {
                    "✓".green().bold()
                } else {
                    "✗".red().bold()
                };
                println!("  {mark} {}  {}", path.display(), compact_summary(result));
            }

            println!("\n{}", "Summary:".bold());
            println!("  Files:          {}", summary.total);
            println!("  Valid:          {}", summary.valid);
            println!("  Invalid:        {}", summary.invalid);
            println!("  Success rate:   {:.1}%", summary.success_rate * 100.0);
            println!("  Total errors:   {}", summary.total_errors);
            println!("  Total warnings: {}", summary.total_warnings);
            println!("{}", "═".repeat(60));
        }
    }
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(60));
    println!("{}", format!("  {title}").bold());
    println!("{}", "═".repeat(60));
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

fn describe(diagnostic: &Diagnostic) -> String {
    let location = diagnostic
        .path()
        .map(|path| format!(" ({path})"))
        .unwrap_or_default();
    let line = format!(
        "[{}] {}{location}",
        diagnostic.kind(),
        diagnostic.message()
    );
    match diagnostic.severity() {
        Severity::Critical => line.red().bold().to_string(),
        Severity::Error => line.red().to_string(),
        Severity::Warning => line.yellow().to_string(),
        Severity::Info => line,
    }
}
