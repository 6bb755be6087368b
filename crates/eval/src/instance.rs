//! Live state for one rendered schema instance.
//!
//! Owns the three maps a rendered form needs: user inputs, derived
//! values, and per-field error messages. All mutation funnels through
//! [`FormInstance::set_input`], which re-validates the edited field and
//! recomputes every derived field before returning, so readers always
//! observe a consistent snapshot. Switching schemas means building a
//! fresh instance; old state is discarded wholesale.

use std::collections::BTreeMap;

use formwork_core::schema::{FieldType, FormSchema};

use crate::schedule::compute_derived_values;
use crate::types::{EvalContext, Value};
use crate::validate::validate_field;

/// Message shown when submit is attempted with outstanding errors.
pub const SUBMIT_BLOCKED: &str = "Please fix errors before submitting.";

/// State for one fillable instance of a saved schema.
#[derive(Debug, Clone)]
pub struct FormInstance {
    schema: FormSchema,
    input_values: BTreeMap<String, Value>,
    derived_values: BTreeMap<String, String>,
    formula_failures: BTreeMap<String, String>,
    errors: BTreeMap<String, String>,
    ctx: EvalContext,
}

impl FormInstance {
    /// Build fresh state for a schema: seed inputs from declared
    /// defaults, then run one derivation pass.
    pub fn new(schema: FormSchema) -> FormInstance {
        FormInstance::with_context(schema, EvalContext::default())
    }

    /// Like [`FormInstance::new`] with an explicit clock, for callers
    /// that need deterministic `computeAge` results.
    pub fn with_context(schema: FormSchema, ctx: EvalContext) -> FormInstance {
        let mut input_values = BTreeMap::new();
        for field in &schema.fields {
            if field.is_derived {
                continue;
            }
            let seed = match field.field_type {
                FieldType::Checkbox => Value::List(Vec::new()),
                _ => Value::Text(field.default_value.clone().unwrap_or_default()),
            };
            input_values.insert(field.label.clone(), seed);
        }
        let mut instance = FormInstance {
            schema,
            input_values,
            derived_values: BTreeMap::new(),
            formula_failures: BTreeMap::new(),
            errors: BTreeMap::new(),
            ctx,
        };
        instance.recompute();
        instance
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn input_values(&self) -> &BTreeMap<String, Value> {
        &self.input_values
    }

    pub fn derived_values(&self) -> &BTreeMap<String, String> {
        &self.derived_values
    }

    /// Formula failures from the latest derivation pass, keyed by
    /// derived-field label. Authoring feedback, not user errors.
    pub fn formula_failures(&self) -> &BTreeMap<String, String> {
        &self.formula_failures
    }

    /// Validation message per edited field; "" means the field passed.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Write path: one user edit. Validates the edited field and
    /// recomputes every derived field. Only real inputs may change;
    /// edits naming a derived or unknown label are refused.
    pub fn set_input(&mut self, label: &str, value: Value) -> Result<(), String> {
        match self.schema.field(label) {
            None => return Err(format!("unknown field '{}'", label)),
            Some(field) if field.is_derived => {
                return Err(format!("'{}' is derived and cannot be edited", label));
            }
            Some(_) => {}
        }
        self.input_values.insert(label.to_owned(), value);
        self.validate_one(label);
        self.recompute();
        Ok(())
    }

    /// Read path: derived values overlaid by inputs. The two key sets
    /// are disjoint by construction; inputs win if they ever collide.
    pub fn combined_values(&self) -> BTreeMap<String, Value> {
        let mut combined: BTreeMap<String, Value> = self
            .derived_values
            .iter()
            .map(|(label, text)| (label.clone(), Value::Text(text.clone())))
            .collect();
        for (label, value) in &self.input_values {
            combined.insert(label.clone(), value.clone());
        }
        combined
    }

    /// Re-validate every editable field, including ones never touched.
    /// Returns true when the instance is submittable.
    pub fn validate_all(&mut self) -> bool {
        let mut errors = BTreeMap::new();
        for field in self.schema.fields.iter().filter(|f| !f.is_derived) {
            let value = self
                .input_values
                .get(&field.label)
                .cloned()
                .unwrap_or(Value::Null);
            errors.insert(field.label.clone(), validate_field(field, &value));
        }
        self.errors = errors;
        self.is_valid()
    }

    /// True when no editable field currently carries an error message.
    /// Reflects only the fields validated so far; [`Self::validate_all`]
    /// covers untouched fields.
    pub fn is_valid(&self) -> bool {
        self.errors.values().all(|m| m.is_empty())
    }

    /// Gate the submit path: run full validation, then hand back the
    /// combined values, or refuse with a user-visible message.
    pub fn submit(&mut self) -> Result<BTreeMap<String, Value>, String> {
        if !self.validate_all() {
            return Err(SUBMIT_BLOCKED.to_owned());
        }
        Ok(self.combined_values())
    }

    fn validate_one(&mut self, label: &str) {
        if let Some(field) = self.schema.field(label) {
            let value = self
                .input_values
                .get(label)
                .cloned()
                .unwrap_or(Value::Null);
            let message = validate_field(field, &value);
            self.errors.insert(label.to_owned(), message);
        }
    }

    fn recompute(&mut self) {
        let outcome = compute_derived_values(&self.schema.fields, &self.input_values, &self.ctx);
        self.derived_values = outcome.values;
        self.formula_failures = outcome.failures;
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
