#![allow(clippy::result_large_err)]
//! formwork-core: Formwork schema model and formula language.
//!
//! Provides the form schema types, the parser for derived-field
//! formulas, and schema validation.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`FormSchema`], [`FieldDefinition`], [`FieldType`], [`ValidationRules`]
//!   -- the persisted schema model
//! - [`parse_formula()`] -- parse a formula string into an [`Expr`]
//! - [`validate_schema()`] -- structural checks, formula parsing, and
//!   cycle detection over a whole schema
//! - [`SchemaError`] -- authoring-time error type

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod validate;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{BinaryOp, Expr, HelperFn};
pub use error::SchemaError;
pub use schema::{FieldDefinition, FieldType, FormSchema, ValidationRules};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use parser::parse_formula;
pub use validate::{derivation_order, validate_schema, DerivationOrder};
