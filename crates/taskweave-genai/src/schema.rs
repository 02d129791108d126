//! JSON-schema validation of model output
//!
//! The generation service returns untyped JSON; every structured response
//! is validated against the schema derived from its target type before
//! deserialization. Failures keep the raw payload and the field-level
//! errors so a run's audit log can show exactly what the model produced.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// JSON pointer to the offending location (empty for the root)
    pub pointer: String,
    /// Human-readable failure description
    pub message: String,
}

/// Structured output failed validation against its response schema
///
/// Always fatal to the task or run that produced it. Carries the raw
/// model payload for auditability.
#[derive(Debug, thiserror::Error)]
#[error("schema validation failed for {type_name}: {}", summarize(.errors))]
pub struct SchemaValidationError {
    /// Name of the expected response type
    pub type_name: &'static str,
    /// The raw payload the model produced
    pub raw: Value,
    /// Field-level errors
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "no detail".to_string();
    }
    errors
        .iter()
        .take(3)
        .map(|e| {
            if e.pointer.is_empty() {
                e.message.clone()
            } else {
                format!("{}: {}", e.pointer, e.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// JSON schema for a response type, suitable for embedding in a prompt
///
/// # Panics
/// Never panics; schema derivation for a `JsonSchema` type is infallible
/// and the result always serializes.
#[must_use]
pub fn response_schema<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}

/// Validate raw model output against `T`'s schema, then deserialize
///
/// # Errors
/// Returns [`SchemaValidationError`] with the raw payload and field errors
/// if the output does not satisfy the schema or cannot deserialize.
pub fn parse_validated<T>(raw: Value) -> Result<T, SchemaValidationError>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = response_schema::<T>();
    let compiled = jsonschema::JSONSchema::compile(&schema).map_err(|e| SchemaValidationError {
        type_name: std::any::type_name::<T>(),
        raw: raw.clone(),
        errors: vec![FieldError {
            pointer: String::new(),
            message: format!("schema compilation failed: {e}"),
        }],
    })?;

    let errors: Vec<FieldError> = match compiled.validate(&raw) {
        Ok(()) => Vec::new(),
        Err(violations) => violations
            .map(|v| FieldError {
                pointer: v.instance_path.to_string(),
                message: v.to_string(),
            })
            .collect(),
    };
    if !errors.is_empty() {
        return Err(SchemaValidationError {
            type_name: std::any::type_name::<T>(),
            raw,
            errors,
        });
    }


    serde_json::from_value(raw.clone()).map_err(|e| SchemaValidationError {
        type_name: std::any::type_name::<T>(),
        raw,
        errors: vec![FieldError {
            pointer: String::new(),
            message: format!("deserialization failed: {e}"),
        }],
    })
}
