// agent-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// The error kinds the request processor catches at its boundary: a bad
/// request or a module's own failure must never take the agent down.
#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Failed to load module: {0}")]
    #[diagnostic(
        code(agent::domain::loading),
        help("Check the module's `metadata` probe output and its executable bit.")
    )]
    LoadingError(String),

    #[error("Failed to process action: {0}")]
    #[diagnostic(code(agent::domain::processing))]
    ProcessingError(String),

    #[error("Validation failed: {0}")]
    #[diagnostic(
        code(agent::domain::validation),
        help("The document does not satisfy the module's registered schema.")
    )]
    ValidationError(String),

    #[error("Envelope could not be parsed as a known request message: {0}")]
    #[diagnostic(code(agent::domain::invalid_envelope))]
    InvalidEnvelope(String),

    #[error("Module '{0}' is unknown or does not advertise action '{1}'")]
    #[diagnostic(code(agent::domain::unknown_action))]
    UnknownAction(String, String),
}
