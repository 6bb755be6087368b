//! Derived-field scheduling.
//!
//! One pass over the derivation graph in dependency order: every
//! derived field sees its parents' fresh values from the same pass, so
//! chained derivations (A feeds B feeds C) settle in a single
//! recomputation instead of lagging one edit behind. Failures stay
//! local to their field.

use std::collections::BTreeMap;

use formwork_core::parse_formula;
use formwork_core::schema::FieldDefinition;
use formwork_core::validate::derivation_order;
use formwork_core::SchemaError;

use crate::expr::eval_expr;
use crate::types::{sanitize, EvalContext, Value};

/// Outcome of one scheduling pass: the values to present plus any
/// per-field failure messages for the schema author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedOutcome {
    /// Display-ready value per derived-field label. Replaces the prior
    /// map wholesale so a removed field leaves no stale entry behind.
    pub values: BTreeMap<String, String>,
    /// Human-readable failure per label whose formula did not produce a
    /// value. Such labels still appear in `values` with "".
    pub failures: BTreeMap<String, String>,
}

impl DerivedOutcome {
    /// True when every formula produced a value this pass.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Compute every derived field's display value from the current inputs.
///
/// Parent lookup order per derived field: `input_values`, then values
/// already computed this pass, then the empty string. A field whose
/// formula fails (or that sits on a dependency cycle) gets "" and a
/// failure message, and its siblings compute normally.
pub fn compute_derived_values(
    fields: &[FieldDefinition],
    input_values: &BTreeMap<String, Value>,
    ctx: &EvalContext,
) -> DerivedOutcome {
    let mut values: BTreeMap<String, String> = BTreeMap::new();
    let mut failures: BTreeMap<String, String> = BTreeMap::new();

    let order = derivation_order(fields);
    if !order.cyclic.is_empty() {
        let members: Vec<&str> = order.cyclic.iter().map(String::as_str).collect();
        let message = format!("cyclic derivation involving fields: {}", members.join(", "));
        for label in &order.cyclic {
            values.insert(label.clone(), String::new());
            failures.insert(label.clone(), message.clone());
        }
    }

    // Values already produced this pass, for chained derived parents.
    // They hold the sanitized display text, the same form a child would
    // read back from the rendered form.
    let mut computed: BTreeMap<String, Value> = BTreeMap::new();

    for label in &order.ordered {
        let field = match fields.iter().find(|f| f.label == *label) {
            Some(f) => f,
            None => continue,
        };
        let formula = match &field.formula {
            Some(f) => f,
            // a derived field without a formula has nothing to compute
            None => continue,
        };

        let mut parents: BTreeMap<String, Value> = BTreeMap::new();
        for parent in &field.derived_from {
            let value = input_values
                .get(parent)
                .cloned()
                .or_else(|| computed.get(parent).cloned())
                .unwrap_or_else(|| Value::Text(String::new()));
            parents.insert(parent.clone(), value);
        }

        let result = match parse_formula(formula) {
            Ok(expr) => eval_expr(&expr, &parents, ctx).map_err(|e| e.to_string()),
            Err(e) => Err(render_schema_error(e)),
        };

        let display = match result {
            Ok(value) => sanitize(&value),
            Err(message) => {
                failures.insert(label.clone(), message);
                String::new()
            }
        };
        computed.insert(label.clone(), Value::Text(display.clone()));
        values.insert(label.clone(), display);
    }

    DerivedOutcome { values, failures }
}

fn render_schema_error(e: SchemaError) -> String {
    match e.column {
        Some(col) => format!("column {}: {}", col, e.message),
        None => e.message,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
