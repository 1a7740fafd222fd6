// agent-core/src/infrastructure/internal_module.rs

use crate::domain::module::Module;
use crate::domain::outcome::ActionOutcome;
use crate::domain::request::ActionRequest;
use crate::domain::DomainError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// The name every agent registers its built-ins under.
pub const INTERNAL_MODULE_NAME: &str = "internal";

const PING_ACTION: &str = "agent.ping";
const METADATA_ACTION: &str = "agent.metadata";

/// Built-in actions implemented in-process: `agent.ping` for liveness checks
/// and `agent.metadata` for registry discovery. Schema validation for these
/// two actions is permissive by design — they take no meaningful input and
/// their result shapes are internal to the agent, not a contract with an
/// external module author — so `validate_input`/`validate_result` always
/// succeed rather than going through the `Validator` port.
pub struct InternalModule {
    actions: Vec<String>,
    /// Snapshot of `module name -> advertised actions` for every *other*
    /// module in the registry, taken once at startup by the loader. Kept as
    /// a plain map rather than a live registry handle so `InternalModule`
    /// never has to see `ModuleRegistry`, which would be a dependency cycle
    /// (the registry holds this module as one of its entries).
    directory: BTreeMap<String, Vec<String>>,
}

impl InternalModule {
    pub fn new(directory: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            actions: vec![PING_ACTION.to_string(), METADATA_ACTION.to_string()],
            directory,
        }
    }

    fn ping() -> serde_json::Value {
        serde_json::json!({
            "pong": true,
            "version": env!("CARGO_PKG_VERSION"),
        })
    }

    fn metadata(&self) -> serde_json::Value {
        serde_json::json!(self.directory)
    }
}

#[async_trait]
impl Module for InternalModule {
    fn name(&self) -> &str {
        INTERNAL_MODULE_NAME
    }

    fn actions(&self) -> &[String] {
        &self.actions
    }

    fn validate_input(&self, _action: &str, _doc: &serde_json::Value) -> Result<(), DomainError> {
        Ok(())
    }

    fn validate_result(&self, _action: &str, _doc: &serde_json::Value) -> Result<(), DomainError> {
        Ok(())
    }

    async fn call(&self, action: &str, request: &ActionRequest) -> Result<ActionOutcome, DomainError> {
        match action {
            PING_ACTION => Ok(ActionOutcome::new(0, "", "", Self::ping())),
            METADATA_ACTION => Ok(ActionOutcome::new(0, "", "", self.metadata())),
            other => Err(DomainError::UnknownAction(
                request.module.clone(),
                other.to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::request::{ParsedEnvelope, RequestKind};

    fn ping_request() -> ActionRequest {
        ActionRequest::new(
            "r1",
            "t1",
            "sender",
            INTERNAL_MODULE_NAME,
            PING_ACTION,
            RequestKind::Blocking,
            serde_json::json!({}),
            ParsedEnvelope::default(),
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ping_reports_success_and_version() {
        let module = InternalModule::new(BTreeMap::new());
        let outcome = module.call(PING_ACTION, &ping_request()).await.unwrap();
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.results["pong"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn metadata_reflects_the_given_directory() {
        let mut directory = BTreeMap::new();
        directory.insert("echo".to_string(), vec!["reflect".to_string()]);
        let module = InternalModule::new(directory);

        let mut request = ping_request();
        request.action = METADATA_ACTION.to_string();
        let outcome = module.call(METADATA_ACTION, &request).await.unwrap();
        assert_eq!(outcome.results["echo"], serde_json::json!(["reflect"]));
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let module = InternalModule::new(BTreeMap::new());
        let err = module.call("agent.nonexistent", &ping_request()).await.unwrap_err();
        assert!(matches!(err, DomainError::UnknownAction(_, _)));
    }
}
