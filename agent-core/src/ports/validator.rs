// agent-core/src/ports/validator.rs

// Schema compilation and validation is an external concern: the core only
// asserts the constraints below through this trait. The concrete
// implementation (`infrastructure::schema_validator`) compiles JSON Schema
// documents with the `jsonschema` crate; this trait exists so the
// application layer never has to know that.

use crate::domain::DomainError;

pub trait Validator: Send + Sync {
    /// Compile `schema` and register it under `name`. Re-registering an
    /// existing name is rejected rather than overwriting it, so a later
    /// load can't silently replace a schema already relied on.
    fn register(&self, name: &str, schema: &serde_json::Value) -> Result<(), DomainError>;

    /// Validate `doc` against the schema previously registered under `name`.
    fn validate(&self, name: &str, doc: &serde_json::Value) -> Result<(), DomainError>;

    /// Whether a schema is registered under `name`.
    fn has_schema(&self, name: &str) -> bool;
}
