// agent-core/src/infrastructure/external_module.rs

use crate::domain::module::Module;
use crate::domain::outcome::{parse_outcome, ActionOutcome, EXIT_OUTPUT_WRITE_FAILURE};
use crate::domain::request::{ActionRequest, RequestKind};
use crate::domain::DomainError;
use crate::infrastructure::metadata::ModuleMetadataDoc;
use crate::infrastructure::process::ChildProcessRunner;
use crate::infrastructure::results_store::ResultsDir;
use crate::ports::validator::Validator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// The environment an action invocation runs with: a clean slate rebuilt
/// from the agent's own environment, rather than an implicit inherit. A
/// probe call never goes through this — it inherits unchanged.
fn call_environment() -> HashMap<String, String> {
    std::env::vars().collect()
}

fn input_schema_name(module: &str, action: &str) -> String {
    format!("{module}.{action}.input")
}

fn results_schema_name(module: &str, action: &str) -> String {
    format!("{module}.{action}.results")
}

/// A module backed by an on-disk executable.
pub struct ExternalModule {
    name: String,
    path: PathBuf,
    config: serde_json::Value,
    actions: Vec<String>,
    validator: Arc<dyn Validator>,
}

impl std::fmt::Debug for ExternalModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalModule")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("config", &self.config)
            .field("actions", &self.actions)
            .finish()
    }
}

impl ExternalModule {
    /// Probe `path`, validate its self-description, and register every
    /// action's input/result schema. Failure at any step means the module is
    /// never partially registered — the caller gets back a `DomainError` and
    /// nothing is inserted into the registry.
    pub async fn load(
        path: PathBuf,
        config: serde_json::Value,
        metadata_schema: &jsonschema::Validator,
        validator: Arc<dyn Validator>,
    ) -> Result<Self, DomainError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DomainError::LoadingError(format!("path has no file stem: {path:?}")))?
            .to_string();

        let probe = ChildProcessRunner::run(&path, &["metadata"], b"", None, None::<fn(u32)>)
            .await
            .map_err(|e| {
                DomainError::LoadingError(format!("failed to probe '{name}' for metadata: {e}"))
            })?;

        if !probe.stderr.is_empty() {
            return Err(DomainError::LoadingError(
                "failed to load external module metadata".to_string(),
            ));
        }

        let doc: serde_json::Value = serde_json::from_str(&probe.stdout).map_err(|e| {
            DomainError::LoadingError(format!("metadata is not in a valid JSON format: {e}"))
        })?;

        metadata_schema
            .validate(&doc)
            .map_err(|e| DomainError::LoadingError(format!("metadata validation failure: {e}")))?;

        let parsed: ModuleMetadataDoc = serde_json::from_value(doc.clone()).map_err(|e| {
            DomainError::LoadingError(format!("metadata validation failure: {e}"))
        })?;

        if !config.is_null() && config_is_nonempty(&config) {
            if let Some(config_schema) = parsed.configuration.as_ref() {
                validator.register(&name, config_schema)?;
                validator.validate(&name, &config)?;
            }
        }

        let mut actions = Vec::with_capacity(parsed.actions.len());
        for action in &parsed.actions {
            if actions.contains(&action.name) {
                return Err(DomainError::LoadingError(format!(
                    "action '{}' is declared more than once in '{name}'s metadata",
                    action.name
                )));
            }
            validator.register(&input_schema_name(&name, &action.name), &action.input)?;
            validator.register(&results_schema_name(&name, &action.name), &action.results)?;
            actions.push(action.name.clone());
        }

        Ok(Self {
            name,
            path,
            config,
            actions,
            validator,
        })
    }

    fn action_arguments(&self, params: &serde_json::Value, output_files: Option<&ResultsDir>) -> serde_json::Value {
        let mut doc = serde_json::Map::new();
        doc.insert("input".to_string(), params.clone());
        if config_is_nonempty(&self.config) {
            doc.insert("configuration".to_string(), self.config.clone());
        }
        if let Some(results) = output_files {
            doc.insert(
                "output_files".to_string(),
                serde_json::json!({
                    "stdout": results.stdout_path(),
                    "stderr": results.stderr_path(),
                    "exitcode": results.exitcode_path(),
                }),
            );
        }
        serde_json::Value::Object(doc)
    }

    async fn call_blocking(
        &self,
        action: &str,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, DomainError> {
        let args = self.action_arguments(&request.params, None);
        let stdin = serde_json::to_vec(&args)
            .map_err(|e| DomainError::ProcessingError(format!("failed to encode action arguments: {e}")))?;

        let envs = call_environment();
        let output = ChildProcessRunner::run(&self.path, &[action], &stdin, Some(&envs), None::<fn(u32)>)
            .await
            .map_err(|e| DomainError::ProcessingError(e.to_string()))?;

        parse_outcome(&request.pretty_label(), output.exit_code, &output.stdout, &output.stderr)
    }

    async fn call_non_blocking(
        &self,
        action: &str,
        request: &ActionRequest,
    ) -> Result<ActionOutcome, DomainError> {
        let results_dir_path = request.results_dir.as_ref().ok_or_else(|| {
            DomainError::InvalidEnvelope(
                "non-blocking call requires a results directory".to_string(),
            )
        })?;
        let results = ResultsDir::create(results_dir_path.clone())
            .map_err(|e| DomainError::ProcessingError(e.to_string()))?;

        let args = self.action_arguments(&request.params, Some(&results));
        let stdin = serde_json::to_vec(&args)
            .map_err(|e| DomainError::ProcessingError(format!("failed to encode action arguments: {e}")))?;

        let pid_sink = |pid: u32| {
            if let Err(e) = results.write_pid(pid) {
                warn!(error = %e, "failed to write pid file");
            }
        };

        let envs = call_environment();
        let output = ChildProcessRunner::run(&self.path, &[action], &stdin, Some(&envs), Some(pid_sink))
            .await
            .map_err(|e| DomainError::ProcessingError(e.to_string()))?;

        if output.exit_code == EXIT_OUTPUT_WRITE_FAILURE {
            debug!(
                stdout = %output.stdout,
                stderr = %output.stderr,
                "non-blocking child reported output-write failure, discarding captured streams"
            );
            return Err(DomainError::ProcessingError(
                "failed to write output on file".to_string(),
            ));
        }

        let stderr_text = results.read_stderr();
        let stdout_text = results
            .read_stdout()
            .map_err(|e| DomainError::ProcessingError(format!("failed to read: {e}")))?;

        parse_outcome(&request.pretty_label(), output.exit_code, &stdout_text, &stderr_text)
    }
}

#[async_trait]
impl Module for ExternalModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn actions(&self) -> &[String] {
        &self.actions
    }

    fn validate_input(&self, action: &str, doc: &serde_json::Value) -> Result<(), DomainError> {
        self.validator.validate(&input_schema_name(&self.name, action), doc)
    }

    fn validate_result(&self, action: &str, doc: &serde_json::Value) -> Result<(), DomainError> {
        self.validator
            .validate(&results_schema_name(&self.name, action), doc)
    }

    async fn call(&self, action: &str, request: &ActionRequest) -> Result<ActionOutcome, DomainError> {
        match request.kind {
            RequestKind::Blocking => self.call_blocking(action, request).await,
            RequestKind::NonBlocking => self.call_non_blocking(action, request).await,
        }
    }
}

fn config_is_nonempty(config: &serde_json::Value) -> bool {
    match config {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
