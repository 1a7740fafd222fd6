// agent-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File system error: {0}")]
    #[diagnostic(
        code(agent::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML parsing error: {0}")]
    #[diagnostic(
        code(agent::infra::yaml),
        help("Check the config file's YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Config file not found at '{0}'")]
    #[diagnostic(code(agent::infra::config_missing))]
    ConfigNotFound(String),

    // --- JSON ---
    #[error("JSON parsing error: {0}")]
    #[diagnostic(code(agent::infra::json))]
    JsonError(#[from] serde_json::Error),

    // --- SCHEMA COMPILATION ---
    #[error("Schema compilation error: {0}")]
    #[diagnostic(
        code(agent::infra::schema_compile),
        help("The document is not a valid JSON Schema.")
    )]
    SchemaCompileError(String),

    // --- CHILD PROCESS ---
    #[error("Failed to spawn child process: {0}")]
    #[diagnostic(code(agent::infra::spawn))]
    SpawnError(String),
}
