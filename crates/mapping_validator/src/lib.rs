//! # Mapping Validator
//!
//! Validation engine for data-mapping job configurations. Validators are
//! layered, each one running everything below it:
//!
//! - **Structural**: mapping shape, column transformations, operation chains
//!   checked against the operation registry
//! - **Comprehensive**: job settings, partition settings, column mapping,
//!   column duplications, source column declarations, SQL injection scanning
//!   and cross-section consistency between declared aliases and their uses
//! - **SQL-enhanced**: quoting, parentheses and alias checks on SQL
//!   expressions in `source_columns_interested`
//!
//! [`JobValidator`] adds validation modes, history and reports on top, and
//! the factory functions pick a validator by [`ValidatorKind`].
//!
//! ## Example
//!
//! ```rust
//! use mapping_validator::{ValidatorKind, validate_str};
//!
//! let yaml = r#"
//! mappings:
//!   - mapping_name: orders
//!     source_columns_interested:
//!       - id as rid
//!     column_transformations:
//!       - source_alias: missing
//!         target_column: record_id
//!         data_type: BIGINT
//!         transformation_type: direct_mapping
//! "#;
//!
//! let result = validate_str(yaml, ValidatorKind::Comprehensive);
//! assert!(!result.is_valid());
//! assert_eq!(result.error_types(), vec!["orphaned_transformation_columns"]);
//! ```

mod alias;
mod config;
mod consistency;
mod engine;
mod error;
mod extended;
mod factory;
mod job;
mod operations;
mod scope;
mod security;
mod sql;
mod structural;
mod summary;

pub use alias::*;
pub use config::*;
pub use consistency::*;
pub use engine::*;
pub use error::*;
pub use extended::*;
pub use factory::*;
pub use job::*;
pub use operations::*;
pub use scope::*;
pub use security::*;
pub use sql::*;
pub use structural::*;
pub use summary::*;
