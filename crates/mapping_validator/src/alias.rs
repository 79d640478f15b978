//! Alias extraction for `source_columns_interested` entries.
//!
//! Entries are either plain column names (`"orders"."id"`, `amount`) or SQL
//! expressions bound to an alias (`price * qty as total`). Extraction works
//! on whitespace-normalized text and tries the shapes below in priority
//! order, so that `CASE ... END as alias` wins over an inner `as`.

use crate::RuleError;
use mapping_core::document::list_field;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::LazyLock;

const IDENTIFIER: &str = "^[a-zA-Z_][a-zA-Z0-9_]*$";

const SQL_INDICATORS: [&str; 16] = [
    "CASE", "case", "||", "+", "-", "*", "/", "(", "CONCAT", "concat", "COALESCE", "coalesce",
    "CAST", "cast", "SUBSTRING", "substring",
];

struct AliasPatterns {
    case_statement: Regex,
    function_call: Regex,
    math_expression: Regex,
    concat_expression: Regex,
    alias: Regex,
    unquoted_alias: Regex,
    quoted_identifier: Regex,
    identifier: Regex,
}

static PATTERNS: LazyLock<Result<AliasPatterns, regex::Error>> = LazyLock::new(|| {
    Ok(AliasPatterns {
        case_statement: Regex::new(r"(?is)\bcase\s+.*?\s+end\s+as\s+([a-zA-Z_][a-zA-Z0-9_]*)")?,
        function_call: Regex::new(
            r"(?i)\b[a-zA-Z_][a-zA-Z0-9_]*\s*\([^)]*\)\s+as\s+([a-zA-Z_][a-zA-Z0-9_]*)",
        )?,
        math_expression: Regex::new(r"(?i)[^)]+[+\-*/][^(]+\s+as\s+([a-zA-Z_][a-zA-Z0-9_]*)")?,
        concat_expression: Regex::new(r"(?i)[^)]+\|\|[^(]+\s+as\s+([a-zA-Z_][a-zA-Z0-9_]*)")?,
        alias: Regex::new(r"(?i)\s+as\s+([a-zA-Z_][a-zA-Z0-9_]*)\s*$")?,
        unquoted_alias: Regex::new(r#""\s+([a-zA-Z_][a-zA-Z0-9_]*)$"#)?,
        quoted_identifier: Regex::new(r#""[^"]*""#)?,
        identifier: Regex::new(IDENTIFIER)?,
    })
});

fn patterns() -> Result<&'static AliasPatterns, RuleError> {
    PATTERNS
        .as_ref()
        .map_err(|e| RuleError::pattern("alias patterns", e.to_string()))
}

/// Which syntactic shape produced an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasShape {
    CaseStatement,
    FunctionCall,
    Mathematical,
    Concatenation,
    /// `expression as alias`
    Standard,
    /// `"quoted" alias`, tolerated without the `as` keyword
    NonStandard,
}

/// Coarse classification of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    CaseStatement,
    Concatenation,
    Mathematical,
    FunctionCall,
    Simple,
}

impl ExpressionType {
    pub fn identify(expression: &str) -> Self {
        let lower = expression.to_lowercase();
        if lower.contains("case") && lower.contains("end") {
            Self::CaseStatement
        } else if expression.contains("||") {
            Self::Concatenation
        } else if ["+", "-", "*", "/"].iter().any(|op| expression.contains(op)) {
            Self::Mathematical
        } else if expression.contains('(') && expression.contains(')') {
            Self::FunctionCall
        } else {
            Self::Simple
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CaseStatement => "case_statement",
            Self::Concatenation => "concatenation",
            Self::Mathematical => "mathematical",
            Self::FunctionCall => "function_call",
            Self::Simple => "simple",
        }
    }

    /// Name used in messages, e.g. `Case_Statement`.
    pub fn title(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join("_")
    }
}

/// Collapses every run of whitespace into one space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the alias an expression is bound to, with the shape that matched.
pub fn extract_alias_with_shape(expression: &str) -> Result<Option<(String, AliasShape)>, RuleError> {
    let patterns = patterns()?;
    let normalized = normalize_whitespace(expression);

    let ordered = [
        (&patterns.case_statement, AliasShape::CaseStatement),
        (&patterns.function_call, AliasShape::FunctionCall),
        (&patterns.math_expression, AliasShape::Mathematical),
        (&patterns.concat_expression, AliasShape::Concatenation),
        (&patterns.alias, AliasShape::Standard),
    ];
    for (regex, shape) in ordered {
        if let Some(alias) = regex.captures(&normalized).and_then(|c| c.get(1)) {
            return Ok(Some((alias.as_str().to_string(), shape)));
        }
    }

    if normalized.matches('"').count() >= 2
        && let Some(alias) = patterns
            .unquoted_alias
            .captures(&normalized)
            .and_then(|c| c.get(1))
    {
        return Ok(Some((alias.as_str().to_string(), AliasShape::NonStandard)));
    }

    Ok(None)
}

/// Extracts the alias an expression is bound to.
///
/// ```rust
/// use mapping_validator::extract_alias;
///
/// let alias = extract_alias("CASE WHEN a = 'x as y' THEN 1 ELSE 0 END as flag").unwrap();
/// assert_eq!(alias.as_deref(), Some("flag"));
/// assert_eq!(extract_alias("customer_id").unwrap(), None);
/// ```
pub fn extract_alias(expression: &str) -> Result<Option<String>, RuleError> {
    Ok(extract_alias_with_shape(expression)?.map(|(alias, _)| alias))
}

/// Bare column name of an entry without a recognizable alias.
///
/// Drops anything after ` as `, a table prefix and surrounding quotes.
pub fn extract_column_name(expression: &str) -> String {
    let mut clean = expression.trim().to_string();
    let lower = clean.to_lowercase();
    if let Some(pos) = lower.find(" as ") {
        clean = lower[..pos].trim().to_string();
    }
    if let Some(last) = clean.rsplit('.').next() {
        clean = last.to_string();
    }
    clean.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// True when an entry contains operators or functions that need an alias.
pub fn looks_like_sql_expression(expression: &str) -> bool {
    SQL_INDICATORS.iter().any(|ind| expression.contains(ind))
}

/// True for `[a-zA-Z_][a-zA-Z0-9_]*`.
pub fn is_valid_identifier(name: &str) -> Result<bool, RuleError> {
    Ok(patterns()?.identifier.is_match(name))
}

/// Every `"..."` identifier in an expression, quotes included.
pub fn quoted_identifiers(expression: &str) -> Result<Vec<&str>, RuleError> {
    Ok(patterns()?
        .quoted_identifier
        .find_iter(expression)
        .map(|m| m.as_str())
        .collect())
}

/// Column names one mapping makes available through `source_columns_interested`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredColumns {
    /// Aliases extracted from expressions
    pub aliases: BTreeSet<String>,
    /// Plain column names of entries without an alias
    pub simple: BTreeSet<String>,
}

impl DeclaredColumns {
    /// Reads the declared columns of a mapping. Non-string entries are skipped.
    pub fn from_mapping(mapping: &Value) -> Result<Self, RuleError> {
        let mut declared = Self::default();
        for entry in list_field(mapping, "source_columns_interested") {
            let Some(expression) = entry.as_str() else {
                continue;
            };
            match extract_alias(expression)? {
                Some(alias) => {
                    declared.aliases.insert(alias);
                }
                None => {
                    declared.simple.insert(extract_column_name(expression));
                }
            }
        }
        Ok(declared)
    }

    /// Aliases and simple names together.
    pub fn all(&self) -> BTreeSet<String> {
        self.aliases.union(&self.simple).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty() && self.simple.is_empty()
    }
}
