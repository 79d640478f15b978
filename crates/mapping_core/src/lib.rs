//! # Mapping Core
//!
//! Diagnostic model for validating data-mapping job configurations.
//!
//! A job configuration is a YAML document with a `settings` section and a list
//! of `mappings`, each describing how columns of a source table become columns
//! of a target table. This crate holds the types every validator shares.
//!
//! ## Key Concepts
//!
//! - **Diagnostic**: One finding with a kind, message, severity, path and extra context
//! - **ValidationResult**: Errors, warnings and info produced by one validation call
//! - **ValidationResultBuilder**: Accumulates diagnostics, then freezes into a result
//! - **ValidationContext**: Scope descriptor producing paths like `mappings[2].column_transformations[0]`
//! - **ValidationMetrics**: Timing and counters attached to a result
//!
//! ## Example
//!
//! ```rust
//! use mapping_core::{Diagnostic, ValidationContext, ValidationResultBuilder};
//!
//! let ctx = ValidationContext::new("mappings[0]").with_mapping("orders");
//!
//! let mut builder = ValidationResultBuilder::new();
//! builder.add_error(
//!     Diagnostic::error("missing_required_field", "Missing required field \"data_type\" in transformation")
//!         .with_path(ctx.with_transformation(0).path())
//!         .with_mapping(ctx.mapping_or_unknown())
//!         .with_extra("field", "data_type"),
//! );
//!
//! let result = builder.build();
//! assert!(!result.is_valid());
//! assert_eq!(result.errors()[0].path(), Some("mappings[0].column_transformations[0]"));
//! ```

pub mod builder;
pub mod context;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod metrics;
pub mod result;
pub mod severity;

pub use builder::*;
pub use context::*;
pub use diagnostic::*;
pub use document::Document;
pub use error::*;
pub use metrics::*;
pub use result::*;
pub use severity::*;
