// agent-core/src/infrastructure/metadata.rs

use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::OnceLock;

/// One action entry inside a module's metadata document.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ActionMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub input: serde_json::Value,
    pub results: serde_json::Value,
}

/// The document an external module prints to stdout when probed with the
/// single argument `"metadata"`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ModuleMetadataDoc {
    pub description: String,
    #[serde(default)]
    pub configuration: Option<serde_json::Value>,
    pub actions: Vec<ActionMetadata>,
}

/// The module-metadata schema, compiled once into an immutable value and
/// injected into every loader call rather than kept as process-wide mutable
/// state. Derived straight from `ModuleMetadataDoc` via `schemars` so the
/// Rust struct and the validated shape can never drift apart.
pub fn metadata_schema() -> &'static serde_json::Value {
    static SCHEMA: OnceLock<serde_json::Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let schema = schemars::schema_for!(ModuleMetadataDoc);
        serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_a_json_object_with_required_fields() {
        let schema = metadata_schema();
        assert!(schema.is_object());
        let required = schema
            .get("required")
            .and_then(|v| v.as_array())
            .expect("schema should declare required fields");
        let required: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
        assert!(required.contains(&"description"));
        assert!(required.contains(&"actions"));
    }

    #[test]
    fn parses_a_well_formed_metadata_document() {
        let doc = serde_json::json!({
            "description": "echoes input back",
            "actions": [
                {"name": "reflect", "input": {"type": "object"}, "results": {"type": "object"}}
            ]
        });
        let parsed: ModuleMetadataDoc = serde_json::from_value(doc).unwrap();
        assert_eq!(parsed.actions.len(), 1);
        assert_eq!(parsed.actions[0].name, "reflect");
    }
}
