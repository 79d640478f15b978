use anyhow::{Result, bail};
use colored::*;
use mapping_validator::{OperationHelp, OperationRegistry};

use crate::output;

const MAX_SUGGESTIONS: usize = 5;

pub fn execute(name: Option<&str>, category: Option<&str>, suggest: Option<&str>) -> Result<()> {
    let registry = OperationRegistry::shared();

    if let Some(partial) = suggest {
        let suggestions = registry.suggestions(partial, MAX_SUGGESTIONS);
        if suggestions.is_empty() {
            output::print_info(&format!("No operations match '{partial}'"));
        }
        for suggestion in suggestions {
            println!("{suggestion}");
        }
        return Ok(());
    }

    if let Some(name) = name {
        let Some(help) = registry.help(name) else {
            let suggestions = registry.suggestions(name, MAX_SUGGESTIONS);
            if suggestions.is_empty() {
                bail!("Unknown operation: {name}");
            }
            bail!(
                "Unknown operation: {name}. Did you mean: {}?",
                suggestions.join(", ")
            );
        };
        print_help(&help);
        return Ok(());
    }

    let categories: Vec<&str> = match category {
        Some(category) => {
            if registry.operations_by_category(category).is_empty() {
                bail!(
                    "Unknown category: {category}. Available: {}",
                    registry.categories().join(", ")
                );
            }
            vec![category]
        }
        None => registry.categories().iter().map(String::as_str).collect(),
    };

    output::print_header("TRANSFORMATION OPERATIONS");
    for category in categories {
        println!("\n{}", category.bold());
        for name in registry.operations_by_category(category) {
            let description = registry
                .get(name)
                .map(|spec| spec.description.as_str())
                .unwrap_or_default();
            println!("  {:<22} {}", name.cyan(), description);
        }
    }
    println!("\n{} operations", registry.len());

    Ok(())
}

fn print_help(help: &OperationHelp) {
    output::print_header(&help.name);
    println!("  Category:    {}", help.category);
    println!("  Description: {}", help.description);

    if !help.parameters.is_empty() {
        println!("\n{}", "Parameters:".bold());
        for parameter in &help.parameters {
            let required = if parameter.required {
                "required".red().to_string()
            } else {
                "optional".to_string()
            };
            println!(
                "  {} ({}, {required})",
                parameter.name.cyan(),
                parameter.param_type.as_str()
            );
            if !parameter.description.is_empty() {
                println!("      {}", parameter.description);
            }
            if let Some(default) = &parameter.default {
                println!("      default: {default}");
            }
            if let Some(choices) = &parameter.choices {
                let choices: Vec<String> = choices.iter().map(ToString::to_string).collect();
                println!("      choices: {}", choices.join(", "));
            }
            if let Some(min) = &parameter.min_value {
                println!("      min: {min}");
            }
            if let Some(max) = &parameter.max_value {
                println!("      max: {max}");
            }
        }
    }

    if !help.examples.is_empty() {
        println!("\n{}", "Examples:".bold());
        for example in &help.examples {
            println!("  {example}");
        }
    }
}
