//! Per-field input validation.
//!
//! Pure function per call: one field definition, one candidate value,
//! one message out. The empty string means the value passed. Messages
//! are end-user copy, shown inline next to the field, so they stay
//! short and fixed.

use formwork_core::schema::{FieldDefinition, FieldType};

use crate::types::Value;

/// Validate a candidate value against a field's rules. Checks run in a
/// fixed order and the first failure wins; an empty required field only
/// ever reports "This field is required", never a length or format
/// complaint on top.
pub fn validate_field(field: &FieldDefinition, value: &Value) -> String {
    // Derived fields are never user-edited; nothing to validate.
    if field.is_derived {
        return String::new();
    }
    let rules = &field.validations;

    if rules.is_required() && is_empty(value) {
        return "This field is required".to_string();
    }

    if let Value::Text(s) = value {
        if let Some(min) = rules.min_length {
            if (s.chars().count() as u32) < min {
                return format!("Minimum length is {}", min);
            }
        }
        if let Some(max) = rules.max_length {
            if (s.chars().count() as u32) > max {
                return format!("Maximum length is {}", max);
            }
        }
        if rules.email == Some(true) && !s.is_empty() && !looks_like_email(s) {
            return "Invalid email address".to_string();
        }
        if rules.password == Some(true) && !s.is_empty() && !meets_password_policy(s) {
            return "Password must be at least 8 characters and include a number".to_string();
        }
    }

    if field.field_type == FieldType::Number {
        // Bounds only apply once the value reads as a number; anything
        // unparseable is left for the input widget to reject.
        let n = value.to_number();
        if !n.is_nan() && !is_empty(value) {
            if let Some(min) = rules.min_value {
                if n < min {
                    return format!("Minimum value is {}", Value::Number(min).display_string());
                }
            }
            if let Some(max) = rules.max_value {
                if n > max {
                    return format!("Maximum value is {}", Value::Number(max).display_string());
                }
            }
        }
    }

    String::new()
}

/// Emptiness for the required check: empty text, empty selection list,
/// or no value at all.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// `local@domain.tld` shape: exactly one '@', no whitespace, and a dot
/// with something on both sides in the domain.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return false,
    };
    if parts.next().is_some() {
        return false;
    }
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// At least 8 characters and at least one digit.
fn meets_password_policy(s: &str) -> bool {
    s.chars().count() >= 8 && s.chars().any(|c| c.is_ascii_digit())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
