//! Runtime values and evaluation errors for the formula engine.
//!
//! These types are DISTINCT from the formwork-core AST. The evaluator
//! consumes a parsed expression plus a map of parent values and produces
//! a single runtime [`Value`]. Coercion here is deliberately forgiving:
//! form inputs arrive as strings, so every operator and helper accepts
//! any value and applies the documented number/text conversions instead
//! of raising type errors.

use std::fmt;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use formwork_core::schema::FieldType;

/// Calendar dates in field values are exchanged as `yyyy-mm-dd`.
pub(crate) const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors that can occur while evaluating a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The formula text failed to lex or parse.
    Syntax {
        message: String,
        column: Option<u32>,
    },
    /// A helper was called with the wrong number of arguments.
    Arity {
        func: String,
        expected: usize,
        got: usize,
    },
    /// `min()`/`max()` over zero arguments has no value to return.
    NoArguments { func: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Syntax {
                message,
                column: Some(col),
            } => {
                write!(f, "syntax error at column {}: {}", col, message)
            }
            EvalError::Syntax {
                message,
                column: None,
            } => {
                write!(f, "syntax error: {}", message)
            }
            EvalError::Arity {
                func,
                expected,
                got,
            } => {
                let plural = if *expected == 1 { "" } else { "s" };
                write!(
                    f,
                    "{}() takes exactly {} argument{}, got {}",
                    func, expected, plural, got
                )
            }
            EvalError::NoArguments { func } => {
                write!(f, "{}() requires at least one argument", func)
            }
        }
    }
}

impl std::error::Error for EvalError {}

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A value flowing through formula evaluation: a literal, a parent
/// field's current value, or a helper result. `Null` marks missing data
/// (a helper that could not produce an answer), not the text "null".
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Multi-select inputs (checkbox groups) hold an ordered list.
    List(Vec<Value>),
}

impl Value {
    /// Coerce to a number. Empty or blank text reads as 0, unparseable
    /// text as NaN; a list coerces through its single element, or NaN
    /// when it has several.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Value::List(items) => match items.as_slice() {
                [] => 0.0,
                [single] => single.to_number(),
                _ => f64::NAN,
            },
        }
    }

    /// Render for display and for string concatenation. Null renders as
    /// the empty string; lists join their elements with commas.
    pub fn display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::display_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Truthiness for conditionals: false, 0, NaN, "" and null are
    /// falsy; everything else (including an empty list) is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::List(_) => true,
        }
    }

    /// Convert from the JSON shapes input files carry. Objects are not
    /// part of the input contract and read as their JSON text.
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(_) => Value::Text(v.to_string()),
        }
    }

    /// Convert to JSON for output. NaN and the infinities have no JSON
    /// number form, so they fall back to their display strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) if n.is_finite() => serde_json::json!(n),
            Value::Number(_) => serde_json::Value::String(self.display_string()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

/// Numbers print without a trailing ".0" when integral, and the
/// non-finite values keep their conventional spellings.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Collapse an evaluation result to the string stored for display.
/// Null and NaN both become the empty string rather than leaking
/// sentinel text into the rendered form.
pub fn sanitize(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(n) if n.is_nan() => String::new(),
        other => other.display_string(),
    }
}

/// Sample value used to exercise a formula while authoring, before any
/// real input exists.
pub fn sample_value(field_type: FieldType, today: Date) -> Value {
    match field_type {
        FieldType::Number => Value::Number(10.0),
        FieldType::Text | FieldType::Textarea => Value::Text("sample".to_string()),
        FieldType::Date => Value::Text(iso_date(today)),
        FieldType::Select | FieldType::Radio | FieldType::Checkbox => Value::Text(String::new()),
    }
}

/// Format a date as `yyyy-mm-dd`.
pub fn iso_date(date: Date) -> String {
    // The format items are all infallible directives, so formatting
    // cannot fail for a valid Date.
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

// ──────────────────────────────────────────────
// Evaluation context
// ──────────────────────────────────────────────

/// Ambient inputs a formula may observe. Injected rather than read from
/// the environment so evaluation is deterministic under test.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Date `computeAge()` measures against.
    pub today: Date,
    /// Substituted for a parent label absent from the parents map.
    pub missing: Value,
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext {
            today: OffsetDateTime::now_utc().date(),
            missing: Value::Text(String::new()),
        }
    }
}

impl EvalContext {
    /// Context pinned to a specific date, with the usual empty-string
    /// fallback for missing parents.
    pub fn at(today: Date) -> EvalContext {
        EvalContext {
            today,
            missing: Value::Text(String::new()),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
