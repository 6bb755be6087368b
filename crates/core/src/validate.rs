//! Schema validation: structural checks on field definitions, formula
//! parsing, and derivation-cycle detection. Runs at save/check time so
//! stores never hold a schema the evaluator cannot handle.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{Expr, HelperFn};
use crate::error::SchemaError;
use crate::parser::parse_formula;
use crate::schema::{FieldDefinition, FieldType, FormSchema};

/// Validate a whole schema. First failure wins, in definition order, so
/// the author sees one actionable error at a time.
pub fn validate_schema(schema: &FormSchema) -> Result<(), SchemaError> {
    if schema.name.trim().is_empty() {
        return Err(SchemaError::schema("form name must not be empty"));
    }

    check_labels(&schema.fields)?;
    for field in &schema.fields {
        check_field(field, schema)?;
    }

    let order = derivation_order(&schema.fields);
    if !order.cyclic.is_empty() {
        let labels: Vec<&str> = order.cyclic.iter().map(String::as_str).collect();
        return Err(SchemaError::schema(format!(
            "cyclic derivation involving fields: {}",
            labels.join(", ")
        )));
    }

    Ok(())
}

fn check_labels(fields: &[FieldDefinition]) -> Result<(), SchemaError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for field in fields {
        if field.label.trim().is_empty() {
            return Err(SchemaError::field(&field.label, "field label must not be empty"));
        }
        if !seen.insert(&field.label) {
            // Labels are the evaluation namespace, so collisions would
            // make parents['X'] ambiguous.
            return Err(SchemaError::field(
                &field.label,
                format!("duplicate field label '{}'", field.label),
            ));
        }
    }
    Ok(())
}

fn check_field(field: &FieldDefinition, schema: &FormSchema) -> Result<(), SchemaError> {
    let label = &field.label;

    // options are exactly the choice-type surface
    if field.field_type.is_choice() {
        let empty = field.options.as_ref().map(|o| o.is_empty()).unwrap_or(true);
        if empty {
            return Err(SchemaError::field(
                label,
                format!(
                    "{} field must declare at least one option",
                    field.field_type.as_str()
                ),
            ));
        }
    } else if field.options.is_some() {
        return Err(SchemaError::field(
            label,
            "'options' only applies to choice fields (select, radio, checkbox)",
        ));
    }

    if field.is_derived {
        check_derived(field, schema)?;
    } else {
        if !field.derived_from.is_empty() {
            return Err(SchemaError::field(
                label,
                "'derivedFrom' only applies to derived fields",
            ));
        }
        if field.formula.is_some() {
            return Err(SchemaError::field(
                label,
                "'formula' only applies to derived fields",
            ));
        }
    }

    for key in field.validations.declared_keys() {
        if !allowed_rules(field.field_type).contains(&key) {
            return Err(SchemaError::field(
                label,
                format!(
                    "validation rule '{}' does not apply to {} fields",
                    key,
                    field.field_type.as_str()
                ),
            ));
        }
    }

    Ok(())
}

fn check_derived(field: &FieldDefinition, schema: &FormSchema) -> Result<(), SchemaError> {
    let label = &field.label;

    if field.field_type.is_choice() {
        return Err(SchemaError::field(
            label,
            "derived fields cannot be select, radio, or checkbox",
        ));
    }
    if field.derived_from.is_empty() {
        return Err(SchemaError::field(
            label,
            "derived field must declare at least one parent",
        ));
    }
    let formula = match &field.formula {
        Some(f) => f,
        None => {
            return Err(SchemaError::field(
                label,
                "derived field must declare a formula",
            ))
        }
    };

    let mut distinct: BTreeSet<&str> = BTreeSet::new();
    for parent in &field.derived_from {
        if parent == label {
            return Err(SchemaError::field(label, "field cannot derive from itself"));
        }
        if schema.field(parent).is_none() {
            return Err(SchemaError::field(
                label,
                format!("unknown parent label '{}'", parent),
            ));
        }
        if !distinct.insert(parent) {
            return Err(SchemaError::field(
                label,
                format!("duplicate parent label '{}'", parent),
            ));
        }
    }

    let expr = parse_formula(formula).map_err(|e| e.with_label(label))?;
    check_calls(&expr).map_err(|e| e.with_label(label))?;

    for referenced in expr.referenced_parents() {
        if !field.derived_from.iter().any(|p| *p == referenced) {
            return Err(SchemaError::field(
                label,
                format!(
                    "formula references '{}', which is not a declared parent",
                    referenced
                ),
            ));
        }
    }

    Ok(())
}

/// Which validation rules make sense per field type. Anything else is an
/// authoring mistake the builder should hear about.
fn allowed_rules(field_type: FieldType) -> &'static [&'static str] {
    match field_type {
        FieldType::Text => &["required", "minLength", "maxLength", "email", "password"],
        FieldType::Number => &["required", "minValue", "maxValue"],
        FieldType::Textarea => &["required", "minLength", "maxLength"],
        FieldType::Select | FieldType::Radio | FieldType::Checkbox | FieldType::Date => {
            &["required"]
        }
    }
}

/// Fixed-arity misuse is caught here so `check`/`save` report it, not
/// just the first evaluation.
fn check_calls(expr: &Expr) -> Result<(), SchemaError> {
    if let Expr::Call { func, args } = expr {
        match func {
            HelperFn::ComputeAge if args.len() != 1 => {
                return Err(SchemaError::schema(format!(
                    "computeAge() takes exactly 1 argument, got {}",
                    args.len()
                )));
            }
            HelperFn::If if args.len() != 3 => {
                return Err(SchemaError::schema(format!(
                    "if() takes exactly 3 arguments, got {}",
                    args.len()
                )));
            }
            HelperFn::Min | HelperFn::Max if args.is_empty() => {
                return Err(SchemaError::schema(format!(
                    "{}() requires at least one argument",
                    func.name()
                )));
            }
            _ => {}
        }
    }
    match expr {
        Expr::Number(_) | Expr::Str(_) | Expr::Parent(_) => Ok(()),
        Expr::Call { args, .. } => {
            for a in args {
                check_calls(a)?;
            }
            Ok(())
        }
        Expr::Neg(inner) => check_calls(inner),
        Expr::Binary { left, right, .. } => {
            check_calls(left)?;
            check_calls(right)
        }
        Expr::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            check_calls(cond)?;
            check_calls(then_branch)?;
            check_calls(else_branch)
        }
    }
}

// ──────────────────────────────────────────────
// Derivation order
// ──────────────────────────────────────────────

/// Result of ordering derived fields by their declared parent edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationOrder {
    /// Derived-field labels in evaluation order: every derived parent
    /// precedes its children, ties broken by schema-declared order.
    pub ordered: Vec<String>,
    /// Labels on or downstream of a dependency cycle. Empty for any
    /// schema that passes [`validate_schema`].
    pub cyclic: BTreeSet<String>,
}

/// Topologically order the derived fields (Kahn's algorithm over the
/// `derivedFrom` edges restricted to derived parents). Non-derived
/// parents are plain inputs and impose no ordering.
pub fn derivation_order(fields: &[FieldDefinition]) -> DerivationOrder {
    let derived_labels: Vec<&str> = fields
        .iter()
        .filter(|f| f.is_derived)
        .map(|f| f.label.as_str())
        .collect();
    let derived_set: BTreeSet<&str> = derived_labels.iter().copied().collect();

    // Per-field set of parents that are themselves derived.
    let mut parents_of: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for field in fields.iter().filter(|f| f.is_derived) {
        let ps: BTreeSet<&str> = field
            .derived_from
            .iter()
            .map(String::as_str)
            .filter(|p| derived_set.contains(p))
            .collect();
        parents_of.insert(field.label.as_str(), ps);
    }

    let mut indegree: BTreeMap<&str, usize> = parents_of
        .iter()
        .map(|(label, ps)| (*label, ps.len()))
        .collect();

    let mut ordered = Vec::new();
    let mut emitted: BTreeSet<&str> = BTreeSet::new();
    loop {
        let mut progressed = false;
        for label in &derived_labels {
            if emitted.contains(label) || indegree[label] != 0 {
                continue;
            }
            emitted.insert(label);
            ordered.push((*label).to_owned());
            progressed = true;
            for (child, ps) in &parents_of {
                if ps.contains(label) {
                    if let Some(d) = indegree.get_mut(child) {
                        *d -= 1;
                    }
                }
            }
        }
        if !progressed {
            break;
        }
    }

    let cyclic = derived_labels
        .iter()
        .filter(|l| !emitted.contains(*l))
        .map(|l| (*l).to_owned())
        .collect();

    DerivationOrder { ordered, cyclic }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
