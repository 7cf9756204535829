//! Common validation helpers for use cases.

use serde_json::Value;

/// Validation error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field_name} must be at least {min} characters")]
    TooShort { field_name: &'static str, min: usize },

    #[error("{field_name} must be a {expected}")]
    WrongType {
        field_name: &'static str,
        expected: &'static str,
    },
}

/// Require a JSON string. `null` counts as the wrong type.
pub fn require_string(value: Value, field_name: &'static str) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(ValidationError::WrongType {
            field_name,
            expected: "string",
        }),
    }
}

/// Require a JSON string or `null`. `null` maps to `None`.
pub fn require_optional_string(
    value: Value,
    field_name: &'static str,
) -> Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        other => require_string(other, field_name).map(Some),
    }
}

/// Require a JSON boolean. `null`, numbers and strings are rejected.
pub fn require_bool(value: &Value, field_name: &'static str) -> Result<bool, ValidationError> {
    value.as_bool().ok_or(ValidationError::WrongType {
        field_name,
        expected: "boolean",
    })
}
