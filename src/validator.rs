//! Payload validation against inferred schemas.
//!
//! Validation itself is delegated to the `jsonschema` crate; this module
//! only adapts its error surface.

use serde_json::Value;

use crate::error::{SchemaError, ValidateError};

/// Validate a value against a JSON Schema document.
///
/// All violations are collected, not just the first.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the schema itself cannot be
/// compiled, or `ValidateError::Invalid` with per-path errors when the
/// value does not match.
pub fn validate_value(schema: &Value, value: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
        message: e.to_string(),
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(value)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matching_value_passes() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        });
        assert!(validate_value(&schema, &json!({"name": "test"})).is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let schema = json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        });
        let result = validate_value(&schema, &json!({}));
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn unknown_field_rejected_when_closed() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "a": { "type": "integer" } }
        });
        let result = validate_value(&schema, &json!({"a": 1, "b": 2}));
        assert!(matches!(result, Err(ValidateError::Invalid { .. })));
    }

    #[test]
    fn collects_all_errors() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" }
            },
            "required": ["name", "age"]
        });
        match validate_value(&schema, &json!({})) {
            Err(ValidateError::Invalid { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("expected two validation errors, got {other:?}"),
        }
    }

    #[test]
    fn uncompilable_schema_is_invalid_schema() {
        let schema = json!({"type": "definitely-not-a-type"});
        let result = validate_value(&schema, &json!(1));
        assert!(matches!(result, Err(ValidateError::InvalidSchema { .. })));
    }
}
