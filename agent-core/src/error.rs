// agent-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    // --- DOMAIN ERRORS (loading, processing, validation, envelopes) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, process spawn, config parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / STARTUP ERRORS ---
    #[error("Internal error: {0}")]
    InternalError(String),
}

// Manual implementation to avoid a duplicate enum variant but keep `?` ergonomics
impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::Infrastructure(InfrastructureError::Io(err))
    }
}
