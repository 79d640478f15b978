//! Validator selection and file/directory entry points.
//!
//! Every function here returns a [`ValidationResult`] even when the input
//! cannot be read or parsed: the failure becomes a single critical
//! `validation_exception` diagnostic.

use crate::{
    ComprehensiveValidator, JobValidator, Result, StructuralValidator, ValidationMode,
    ValidatorError,
};
use mapping_core::ValidationResult;
use mapping_parser::{check_structure, is_config_file, parse_file, parse_yaml};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Extensions scanned by [`validate_directory`] when none are given.
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["yaml", "yml", "toml"];

/// Selects which validator runs over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    /// Mapping and column transformation checks only
    Basic,
    #[default]
    Comprehensive,
    /// Job validator in comprehensive mode, repeated diagnostics kept
    Job,
    /// Job validator in comprehensive mode with deduplicated results
    ExtendedJob,
    /// Job validator in SQL-enhanced mode
    SqlEnhanced,
    /// Root shape checks without any rules
    ParserOnly,
}

impl ValidatorKind {
    pub const ALL: [ValidatorKind; 6] = [
        Self::Basic,
        Self::Comprehensive,
        Self::Job,
        Self::ExtendedJob,
        Self::SqlEnhanced,
        Self::ParserOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Comprehensive => "comprehensive",
            Self::Job => "job",
            Self::ExtendedJob => "extended_job",
            Self::SqlEnhanced => "sql_enhanced",
            Self::ParserOnly => "parser_only",
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidatorKind {
    type Err = ValidatorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ValidatorError::UnknownKind(s.to_string()))
    }
}

/// Description of one [`ValidatorKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorInfo {
    pub kind: ValidatorKind,
    pub validator: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

pub fn validator_info(kind: ValidatorKind) -> ValidatorInfo {
    let (validator, description, features): (_, _, &'static [&'static str]) = match kind {
        ValidatorKind::Basic => (
            "StructuralValidator",
            "Basic mapping and transformation validation",
            &["basic_validation", "transformation_validation", "operation_validation"],
        ),
        ValidatorKind::Comprehensive => (
            "ComprehensiveValidator",
            "Comprehensive validation of every document section",
            &[
                "comprehensive_validation",
                "cross_section_validation",
                "sql_security",
            ],
        ),
        ValidatorKind::Job => (
            "JobValidator",
            "Job validation with history tracking",
            &[
                "job_validation",
                "validation_history",
                "performance_metrics",
                "enhanced_reporting",
            ],
        ),
        ValidatorKind::ExtendedJob => (
            "JobValidator",
            "Job validation with error deduplication",
            &["job_validation", "enhanced_validation", "error_deduplication"],
        ),
        ValidatorKind::SqlEnhanced => (
            "JobValidator",
            "SQL-enhanced validation with comprehensive features",
            &[
                "sql_expressions",
                "comprehensive_validation",
                "advanced_sql_analysis",
            ],
        ),
        ValidatorKind::ParserOnly => (
            "mapping_parser",
            "Document parsing and root structure checks",
            &["yaml_parsing", "toml_parsing", "structure_validation"],
        ),
    };

    ValidatorInfo {
        kind,
        validator,
        description,
        features,
    }
}

/// Validates a parsed document with the selected validator.
pub fn validate_document(document: &Value, kind: ValidatorKind) -> ValidationResult {
    debug!(kind = %kind, "Validating document");
    match kind {
        ValidatorKind::Basic => StructuralValidator::new().validate(document),
        ValidatorKind::Comprehensive => ComprehensiveValidator::new().validate(document),
        ValidatorKind::Job => JobValidator::new(ValidationMode::Comprehensive)
            .with_deduplication(false)
            .validate(document),
        ValidatorKind::ExtendedJob => {
            JobValidator::new(ValidationMode::Comprehensive).validate(document)
        }
        ValidatorKind::SqlEnhanced => {
            JobValidator::new(ValidationMode::SqlEnhanced).validate(document)
        }
        ValidatorKind::ParserOnly => check_structure(document),
    }
}

/// Parses YAML text, then validates it.
pub fn validate_str(text: &str, kind: ValidatorKind) -> ValidationResult {
    match parse_yaml(text) {
        Ok(document) => validate_document(&document, kind),
        Err(e) => {
            warn!(error = %e, "Could not parse configuration text");
            ValidationResult::from_exception(e, None, "validate_string")
        }
    }
}

/// Parses a YAML or TOML file, then validates it.
pub fn validate_file(path: &Path, kind: ValidatorKind) -> ValidationResult {
    match parse_file(path) {
        Ok(document) => validate_document(&document, kind),
        Err(e) => ValidationResult::from_exception(
            e,
            None,
            &format!("validate_file({})", path.display()),
        ),
    }
}

/// Comprehensive validity of a file path or, when no such file exists, of
/// YAML text.
pub fn quick_validate(input: &str) -> bool {
    let path = Path::new(input);
    let result = if path.is_file() {
        validate_file(path, ValidatorKind::Comprehensive)
    } else {
        validate_str(input, ValidatorKind::Comprehensive)
    };
    result.is_valid()
}

/// Validates every file directly inside `dir` whose extension is one of
/// `extensions` (case-insensitive). Results are keyed and ordered by path.
pub fn validate_directory(
    dir: &Path,
    extensions: &[&str],
    kind: ValidatorKind,
) -> Result<BTreeMap<PathBuf, ValidationResult>> {
    if !dir.is_dir() {
        return Err(ValidatorError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut results = BTreeMap::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_config_file(&path) {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if matches {
            let result = validate_file(&path, kind);
            results.insert(path, result);
        }
    }

    info!(directory = %dir.display(), files = results.len(), "Directory validated");
    Ok(results)
}

/// Aggregate statistics over [`validate_directory`] results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectorySummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Valid files over total, `0.0` for an empty directory
    pub success_rate: f64,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub invalid_files: Vec<PathBuf>,
    pub files_with_warnings: Vec<PathBuf>,
    pub avg_errors_per_file: f64,
    pub avg_warnings_per_file: f64,
}

pub fn summarize_directory(results: &BTreeMap<PathBuf, ValidationResult>) -> DirectorySummary {
    let total = results.len();
    let valid = results.values().filter(|r| r.is_valid()).count();
    let total_errors = results.values().map(|r| r.errors().len()).sum();
    let total_warnings = results.values().map(|r| r.warnings().len()).sum();
    let per_file = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    };

    DirectorySummary {
        total,
        valid,
        invalid: total - valid,
        success_rate: per_file(valid),
        total_errors,
        total_warnings,
        invalid_files: results
            .iter()
            .filter(|(_, r)| !r.is_valid())
            .map(|(path, _)| path.clone())
            .collect(),
        files_with_warnings: results
            .iter()
            .filter(|(_, r)| r.has_warnings())
            .map(|(path, _)| path.clone())
            .collect(),
        avg_errors_per_file: per_file(total_errors),
        avg_warnings_per_file: per_file(total_warnings),
    }
}
