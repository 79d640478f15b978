//! Cross-section column consistency.
//!
//! A mapping declares the columns it reads in `source_columns_interested`
//! (plain names or aliased expressions). `columns_mapping`,
//! `column_duplications` and `column_transformations` then refer to those
//! columns by name. Any reference that resolves to nothing declared is an
//! orphan.
//!
//! Orphaned transformation aliases are errors. Orphaned mapping and
//! duplication references keep warning severity but land in the errors
//! bucket, so they also make the document invalid.

use crate::{DeclaredColumns, RuleError, RuleOutcome};
use mapping_core::document::{list_field, render};
use mapping_core::{Diagnostic, ValidationContext, ValidationResult, ValidationResultBuilder};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Diagnostic kinds counted by [`ConsistencyAnalysis`].
pub const ORPHAN_KINDS: [&str; 3] = [
    "orphaned_mapped_columns",
    "orphaned_duplicated_columns",
    "orphaned_transformation_columns",
];

const POINTS_PER_ISSUE: usize = 15;

/// Column references one mapping makes outside `source_columns_interested`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnReferences {
    pub mapped: BTreeSet<String>,
    pub duplicated: BTreeSet<String>,
    pub transformed: BTreeSet<String>,
}

impl ColumnReferences {
    pub fn from_mapping(mapping: &Value) -> Self {
        let mapped = mapping
            .get("columns_mapping")
            .and_then(Value::as_object)
            .map(|columns| columns.keys().cloned().collect())
            .unwrap_or_default();

        let duplicated = list_field(mapping, "column_duplications")
            .iter()
            .filter_map(|entry| entry.get("source_column"))
            .map(render)
            .collect();

        let transformed = list_field(mapping, "column_transformations")
            .iter()
            .filter_map(|entry| entry.get("source_alias"))
            .map(render)
            .collect();

        Self {
            mapped,
            duplicated,
            transformed,
        }
    }
}

/// Flags references to columns `source_columns_interested` never declares.
///
/// Nothing is reported when the mapping declares no columns at all.
pub fn validate_column_consistency(
    mapping: &Value,
    ctx: &ValidationContext,
) -> Result<RuleOutcome, RuleError> {
    let declared = DeclaredColumns::from_mapping(mapping)?.all();
    if declared.is_empty() {
        return Ok(RuleOutcome::NoFindings);
    }

    let references = ColumnReferences::from_mapping(mapping);
    let mut builder = ValidationResultBuilder::new();

    let orphaned: Vec<&str> = references
        .mapped
        .iter()
        .filter(|c| !declared.contains(*c))
        .map(String::as_str)
        .collect();
    if !orphaned.is_empty() {
        builder.add_error(
            Diagnostic::warning(
                "orphaned_mapped_columns",
                format!(
                    "Columns in mapping but not in source_columns_interested: {}",
                    bracketed(&orphaned)
                ),
            )
            .with_path(ctx.path_with("columns_mapping"))
            .with_extra("orphaned_columns", orphaned)
            .with_suggestion("Ensure mapped columns are included in source_columns_interested"),
        );
    }

    let orphaned: Vec<&str> = references
        .duplicated
        .iter()
        .filter(|c| !declared.contains(*c))
        .map(String::as_str)
        .collect();
    if !orphaned.is_empty() {
        builder.add_error(
            Diagnostic::warning(
                "orphaned_duplicated_columns",
                format!(
                    "Duplicated columns not in source_columns_interested: {}",
                    bracketed(&orphaned)
                ),
            )
            .with_path(ctx.path_with("column_duplications"))
            .with_extra("orphaned_columns", orphaned)
            .with_suggestion(
                "Ensure duplicated columns are included in source_columns_interested",
            ),
        );
    }

    let orphaned: Vec<&str> = references
        .transformed
        .iter()
        .filter(|c| !declared.contains(*c))
        .map(String::as_str)
        .collect();
    if !orphaned.is_empty() {
        let available: Vec<&str> = declared.iter().map(String::as_str).collect();
        builder.add_error(
            Diagnostic::error(
                "orphaned_transformation_columns",
                format!(
                    "Column transformation source aliases not found in source_columns_interested: {}",
                    bracketed(&orphaned)
                ),
            )
            .with_path(ctx.path_with("column_transformations"))
            .with_extra("orphaned_columns", orphaned)
            .with_extra("available_columns", available.clone())
            .with_suggestion(format!(
                "Add missing aliases to source_columns_interested or update source_alias in transformations. Available: {}",
                bracketed(&available)
            )),
        );
    }

    Ok(builder.build().into())
}

fn bracketed(items: &[&str]) -> String {
    format!("[{}]", items.join(", "))
}

/// Score of how well the sections of a document agree, out of 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyAnalysis {
    pub score: usize,
    pub total_issues: usize,
    /// Count per orphan kind, in [`ORPHAN_KINDS`] order
    pub error_breakdown: Vec<(String, usize)>,
}

impl ConsistencyAnalysis {
    /// Deducts 15 points per orphan diagnostic in the errors bucket.
    pub fn from_result(result: &ValidationResult) -> Self {
        let error_breakdown: Vec<(String, usize)> = ORPHAN_KINDS
            .iter()
            .map(|kind| (kind.to_string(), result.errors_by_type(kind).len()))
            .collect();
        let total_issues = error_breakdown.iter().map(|(_, n)| n).sum::<usize>();

        Self {
            score: 100usize.saturating_sub(total_issues * POINTS_PER_ISSUE),
            total_issues,
            error_breakdown,
        }
    }
}
