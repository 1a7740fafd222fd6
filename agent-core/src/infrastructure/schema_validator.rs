// agent-core/src/infrastructure/schema_validator.rs

use crate::domain::DomainError;
use crate::ports::validator::Validator;
use jsonschema::Validator as CompiledSchema;
use std::collections::HashMap;
use std::sync::RwLock;

/// Compile-once, validate-many JSON Schema cache (grounded on
/// `sargunv-jvl`'s `SchemaCache` — the only repo in the retrieval pack
/// with a real JSON Schema dependency).
///
/// Each action registers two schemas (`<action>` for input, a second
/// store for results — see `infrastructure::external_module`), so callers
/// pick their own naming convention for `name`; this type only guarantees
/// "register once, reject on collision".
#[derive(Default)]
pub struct JsonSchemaValidator {
    schemas: RwLock<HashMap<String, CompiledSchema>>,
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Validator for JsonSchemaValidator {
    fn register(&self, name: &str, schema: &serde_json::Value) -> Result<(), DomainError> {
        let mut schemas = self
            .schemas
            .write()
            .unwrap_or_else(|e| e.into_inner());

        if schemas.contains_key(name) {
            return Err(DomainError::LoadingError(format!(
                "a schema named '{name}' is already registered"
            )));
        }

        let compiled = jsonschema::validator_for(schema)
            .map_err(|e| DomainError::LoadingError(format!("invalid schema '{name}': {e}")))?;

        schemas.insert(name.to_string(), compiled);
        Ok(())
    }

    fn validate(&self, name: &str, doc: &serde_json::Value) -> Result<(), DomainError> {
        let schemas = self.schemas.read().unwrap_or_else(|e| e.into_inner());
        let compiled = schemas
            .get(name)
            .ok_or_else(|| DomainError::ValidationError(format!("no schema registered for '{name}'")))?;

        compiled
            .validate(doc)
            .map_err(|e| DomainError::ValidationError(format!("{name}: {e}")))
    }

    fn has_schema(&self, name: &str) -> bool {
        self.schemas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_document_passes() {
        let validator = JsonSchemaValidator::new();
        validator
            .register("echo.reflect.input", &json!({"type": "object", "properties": {"x": {"type": "string"}}, "required": ["x"]}))
            .unwrap();

        assert!(validator.validate("echo.reflect.input", &json!({"x": "hi"})).is_ok());
    }

    #[test]
    fn type_mismatch_fails() {
        let validator = JsonSchemaValidator::new();
        validator
            .register("echo.reflect.input", &json!({"type": "object", "properties": {"x": {"type": "string"}}, "required": ["x"]}))
            .unwrap();

        assert!(validator.validate("echo.reflect.input", &json!({"x": 42})).is_err());
    }

    #[test]
    fn re_registering_same_name_is_rejected() {
        let validator = JsonSchemaValidator::new();
        validator.register("a", &json!({"type": "object"})).unwrap();
        let err = validator.register("a", &json!({"type": "object"})).unwrap_err();
        assert!(matches!(err, DomainError::LoadingError(_)));
    }

    #[test]
    fn missing_schema_is_a_validation_error_not_a_panic() {
        let validator = JsonSchemaValidator::new();
        let err = validator.validate("missing", &json!({})).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }
}
