// agent-core/src/infrastructure/mod.rs

pub mod error;
pub mod external_module;
pub mod internal_module;
pub mod metadata;
pub mod process;
pub mod results_store;
pub mod schema_validator;

pub use error::InfrastructureError;
pub use external_module::ExternalModule;
pub use internal_module::InternalModule;
pub use process::ChildProcessRunner;
pub use results_store::ResultsDir;
pub use schema_validator::JsonSchemaValidator;
