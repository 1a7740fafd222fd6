pub mod error;
pub mod module;
pub mod outcome;
pub mod request;

// Convenience re-exports so callers can `use agent_core::domain::ActionRequest`
// without knowing the internal file layout.
pub use error::DomainError;
pub use module::Module;
pub use outcome::{parse_outcome, ActionOutcome};
pub use request::{ActionRequest, DebugChunk, ParsedEnvelope, RequestKind};
