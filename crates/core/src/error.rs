use serde::{Deserialize, Serialize};

/// An authoring-time schema error. Produced by the formula parser and by
/// schema validation; rendered back to the author by `check` and `save`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaError {
    /// Label of the field the error is about, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// 1-based column in the formula text for lex/parse errors.
    /// Formulas are single-line, so a column is the whole position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub message: String,
}

impl SchemaError {
    pub fn new(label: Option<&str>, column: Option<u32>, message: impl Into<String>) -> Self {
        SchemaError {
            label: label.map(str::to_owned),
            column,
            message: message.into(),
        }
    }

    pub fn lex(column: u32, message: impl Into<String>) -> Self {
        SchemaError::new(None, Some(column), message)
    }

    pub fn parse(column: u32, message: impl Into<String>) -> Self {
        SchemaError::new(None, Some(column), message)
    }

    /// An error about a specific field definition.
    pub fn field(label: &str, message: impl Into<String>) -> Self {
        SchemaError::new(Some(label), None, message)
    }

    /// A schema-wide error not attached to any field.
    pub fn schema(message: impl Into<String>) -> Self {
        SchemaError::new(None, None, message)
    }

    /// Attach the owning field's label to a formula lex/parse error.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_owned());
        self
    }

    /// Serialize to JSON with a stable shape: all keys present, null for missing.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "label":   self.label,
            "column":  self.column,
            "message": self.message,
        })
    }
}
