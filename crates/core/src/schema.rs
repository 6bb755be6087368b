//! Form schema data model.
//!
//! These types are the persisted layout: a saved form is one
//! `{id, name, createdAt, fields: [...]}` document with camelCase keys,
//! and `validations` a flat object of optional bounds/flags. Field labels
//! are the evaluation namespace: derived formulas reference parents by
//! label, so labels must be unique within a schema (enforced by
//! [`crate::validate::validate_schema`]).

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Field types
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    /// Choice types carry an `options` list and render as pickers.
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio | FieldType::Checkbox)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
        }
    }
}

// ──────────────────────────────────────────────
// Validation rules
// ──────────────────────────────────────────────

/// Per-field validation rules. All optional; absence means unconstrained.
/// `min_length`/`max_length` apply to string values, `min_value`/`max_value`
/// to number-typed fields, `password` means ≥8 chars with at least one digit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<bool>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.required.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
            && self.email.is_none()
            && self.password.is_none()
    }

    /// Keys of the rules that are actually set, in declaration order.
    /// Used by schema validation to check per-type applicability.
    pub fn declared_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.required.is_some() {
            keys.push("required");
        }
        if self.min_length.is_some() {
            keys.push("minLength");
        }
        if self.max_length.is_some() {
            keys.push("maxLength");
        }
        if self.min_value.is_some() {
            keys.push("minValue");
        }
        if self.max_value.is_some() {
            keys.push("maxValue");
        }
        if self.email.is_some() {
            keys.push("email");
        }
        if self.password.is_some() {
            keys.push("password");
        }
        keys
    }

    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }
}

// ──────────────────────────────────────────────
// Field and schema
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Present only for choice types (select, radio, checkbox).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "ValidationRules::is_empty")]
    pub validations: ValidationRules,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_derived: bool,
    /// Parent field labels; non-empty iff `is_derived`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived_from: Vec<String>,
    /// Formula text; present iff `is_derived`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl FieldDefinition {
    pub fn plain(id: &str, field_type: FieldType, label: &str) -> FieldDefinition {
        FieldDefinition {
            id: id.to_owned(),
            field_type,
            label: label.to_owned(),
            default_value: None,
            options: None,
            validations: ValidationRules::default(),
            is_derived: false,
            derived_from: Vec::new(),
            formula: None,
        }
    }

    /// A derived field computing `formula` over the given parent labels.
    pub fn derived(
        id: &str,
        field_type: FieldType,
        label: &str,
        derived_from: &[&str],
        formula: &str,
    ) -> FieldDefinition {
        FieldDefinition {
            id: id.to_owned(),
            field_type,
            label: label.to_owned(),
            default_value: None,
            options: None,
            validations: ValidationRules::default(),
            is_derived: true,
            derived_from: derived_from.iter().map(|s| (*s).to_owned()).collect(),
            formula: Some(formula.to_owned()),
        }
    }
}

/// A named, ordered collection of field definitions representing one form.
/// Immutable once saved except for full deletion; owned by the schema store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
    pub fields: Vec<FieldDefinition>,
}

impl FormSchema {
    /// Stamp a fresh identity for the save path: a v4 UUID id and the
    /// current UTC time. Loaded schemas keep their stored identity.
    pub fn with_identity(name: impl Into<String>, fields: Vec<FieldDefinition>) -> FormSchema {
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());
        FormSchema {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            created_at,
            fields,
        }
    }

    pub fn field(&self, label: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.label == label)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
