//! Formwork formula evaluator -- computes derived-field values,
//! validates inputs, and holds live state for one rendered form.
//!
//! The evaluator consumes parsed formulas (formwork-core) plus the
//! current input values, runs one dependency-ordered derivation pass,
//! and returns display-ready values with per-field failure isolation.

use std::collections::BTreeMap;

use formwork_core::parse_formula;

pub mod expr;
pub mod funcs;
pub mod instance;
pub mod schedule;
pub mod types;
pub mod validate;

pub use instance::{FormInstance, SUBMIT_BLOCKED};
pub use schedule::{compute_derived_values, DerivedOutcome};
pub use types::{sample_value, sanitize, EvalContext, EvalError, Value};
pub use validate::validate_field;

/// Evaluate one formula against a parent-value map.
///
/// This is the top-level public API for a single evaluation: parse the
/// text, then walk the tree. Scheduling across a whole schema is
/// [`compute_derived_values`]; live form state is [`FormInstance`].
pub fn evaluate_formula(
    formula: &str,
    parents: &BTreeMap<String, Value>,
    ctx: &EvalContext,
) -> Result<Value, EvalError> {
    let expr = parse_formula(formula).map_err(|e| EvalError::Syntax {
        message: e.message,
        column: e.column,
    })?;
    expr::eval_expr(&expr, parents, ctx)
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
