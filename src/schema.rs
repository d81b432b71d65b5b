use jsonschema::{validator_for, Validator};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("{0}")]
    Invalid(String),
}

/// A compiled JSON Schema (draft 2020-12) used to check tool arguments.
pub struct ArgumentValidator {
    validator: Validator,
}

impl ArgumentValidator {
    pub fn new(schema: &Value) -> Result<Self, SchemaValidationError> {
        let validator = validator_for(schema)
            .map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Returns the first violation, rendered for a human reader.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        self.validator
            .validate(instance)
            .map_err(|e| SchemaValidationError::Invalid(e.to_string()))
    }
}

impl std::fmt::Debug for ArgumentValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentValidator").finish_non_exhaustive()
    }
}

/// Validate a JSON instance against a JSON Schema in one shot.
pub fn validate_json(schema: &Value, instance: &Value) -> Result<(), SchemaValidationError> {
    ArgumentValidator::new(schema)?.validate(instance)
}
