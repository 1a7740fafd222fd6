// agent-core/src/domain/module.rs

use crate::domain::error::DomainError;
use crate::domain::outcome::ActionOutcome;
use crate::domain::request::ActionRequest;
use async_trait::async_trait;

/// The capability set every loaded module exposes, whether it's an
/// in-process built-in or a wrapped on-disk executable.
///
/// Realized as a trait object (`Box<dyn Module>`) rather than a closed
/// `enum { Internal, External }` so the domain layer never depends on the
/// infrastructure types that implement it (`InternalModule`,
/// `ExternalModule` both live in `infrastructure`).
#[async_trait]
pub trait Module: Send + Sync {
    /// Non-empty, unique within the registry.
    fn name(&self) -> &str;

    /// The action names this module advertises, in registration order.
    fn actions(&self) -> &[String];

    fn validate_input(&self, action: &str, doc: &serde_json::Value) -> Result<(), DomainError>;

    fn validate_result(&self, action: &str, doc: &serde_json::Value) -> Result<(), DomainError>;

    async fn call(
        &self,
        action: &str,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, DomainError>;

    /// Whether this module advertises the given action name.
    fn has_action(&self, action: &str) -> bool {
        self.actions().iter().any(|a| a == action)
    }
}
