// agent-core/src/application/loader.rs

use crate::application::registry::ModuleRegistry;
use crate::domain::module::Module;
use crate::infrastructure::external_module::ExternalModule;
use crate::infrastructure::internal_module::{InternalModule, INTERNAL_MODULE_NAME};
use crate::infrastructure::metadata::metadata_schema;
use crate::ports::validator::Validator;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the `internal` built-in and insert it into `modules`, including its
/// own two actions in the directory snapshot it hands back through
/// `agent.metadata` — otherwise that action would never list itself.
fn insert_internal_module(modules: &mut HashMap<String, Box<dyn Module>>) {
    let mut directory: BTreeMap<String, Vec<String>> = modules
        .iter()
        .map(|(name, module)| (name.clone(), module.actions().to_vec()))
        .collect();
    let self_actions = InternalModule::new(BTreeMap::new()).actions().to_vec();
    directory.insert(INTERNAL_MODULE_NAME.to_string(), self_actions);
    modules.insert(INTERNAL_MODULE_NAME.to_string(), Box::new(InternalModule::new(directory)));
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Scan `modules_dir` for executable candidates, load each as an
/// `ExternalModule`, and fold them into an immutable registry alongside the
/// `internal` built-in.
///
/// A candidate that fails to load is logged at `warn` and skipped — loading
/// continues with the rest. A name collision with an earlier-registered
/// module (including the `internal` built-in) is treated the same way: the
/// first registration wins.
pub async fn load_registry(modules_dir: &Path, validator: Arc<dyn Validator>) -> ModuleRegistry {
    let schema = match jsonschema::validator_for(metadata_schema()) {
        Ok(schema) => schema,
        Err(e) => {
            // The schema is derived from our own types; a compile failure
            // here means nothing can load, but the agent still starts with
            // only the internal built-ins available.
            warn!(error = %e, "module metadata schema failed to compile, external modules will not load");
            let mut modules: HashMap<String, Box<dyn Module>> = HashMap::new();
            insert_internal_module(&mut modules);
            return ModuleRegistry::new(modules);
        }
    };

    let mut modules: HashMap<String, Box<dyn Module>> = HashMap::new();

    let mut entries = match tokio::fs::read_dir(modules_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, path = %modules_dir.display(), "could not read modules directory, starting with no external modules");
            insert_internal_module(&mut modules);
            return ModuleRegistry::new(modules);
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "error reading modules directory entry, stopping scan");
                break;
            }
        };

        let path = entry.path();
        let candidate_metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "could not stat candidate module, skipping");
                continue;
            }
        };

        if !candidate_metadata.is_file() || !is_executable(&candidate_metadata) {
            continue;
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if modules.contains_key(&name) || name == INTERNAL_MODULE_NAME {
            warn!(name, path = %path.display(), "module name collision, keeping the first registration");
            continue;
        }

        match ExternalModule::load(path.clone(), serde_json::Value::Null, &schema, validator.clone()).await {
            Ok(module) => {
                info!(name, actions = module.actions().len(), "loaded external module");
                modules.insert(name, Box::new(module));
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load module candidate, skipping");
            }
        }
    }

    insert_internal_module(&mut modules);

    ModuleRegistry::new(modules)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::schema_validator::JsonSchemaValidator;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    #[tokio::test]
    async fn loads_valid_modules_and_skips_broken_ones() {
        let dir = tempdir().unwrap();

        let good = dir.path().join("echo");
        fs::write(
            &good,
            r#"#!/bin/sh
if [ "$1" = "metadata" ]; then
  echo '{"description":"echoes input","actions":[{"name":"reflect","input":{"type":"object"},"results":{"type":"object"}}]}'
fi
"#,
        )
        .unwrap();
        fs::set_permissions(&good, fs::Permissions::from_mode(0o755)).unwrap();

        let broken = dir.path().join("broken");
        fs::write(&broken, "#!/bin/sh\necho 'not json'\n").unwrap();
        fs::set_permissions(&broken, fs::Permissions::from_mode(0o755)).unwrap();

        let not_executable = dir.path().join("readme.txt");
        fs::write(&not_executable, "not a module").unwrap();

        let validator: Arc<dyn Validator> = Arc::new(JsonSchemaValidator::new());
        let registry = load_registry(dir.path(), validator).await;

        assert!(registry.resolve("echo", "reflect").is_some());
        assert!(registry.get("broken").is_none());
        assert!(registry.get("readme").is_none());
        assert!(registry.get(INTERNAL_MODULE_NAME).is_some());
    }

    #[tokio::test]
    async fn missing_modules_dir_still_yields_internal_module() {
        let validator: Arc<dyn Validator> = Arc::new(JsonSchemaValidator::new());
        let registry = load_registry(Path::new("/no/such/directory"), validator).await;
        assert!(registry.get(INTERNAL_MODULE_NAME).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn agent_metadata_action_lists_the_internal_module_itself() {
        use crate::domain::request::{ActionRequest, ParsedEnvelope, RequestKind};

        let validator: Arc<dyn Validator> = Arc::new(JsonSchemaValidator::new());
        let registry = load_registry(Path::new("/no/such/directory"), validator).await;
        let internal = registry.get(INTERNAL_MODULE_NAME).unwrap();

        let request = ActionRequest::new(
            "r1",
            "t1",
            "sender",
            INTERNAL_MODULE_NAME,
            "agent.metadata",
            RequestKind::Blocking,
            serde_json::json!({}),
            ParsedEnvelope::default(),
            None,
        )
        .unwrap();

        let outcome = internal.call("agent.metadata", &request).await.unwrap();
        assert!(outcome.results.get(INTERNAL_MODULE_NAME).is_some());
    }
}
