// agent-core/src/application/registry.rs

use crate::domain::module::Module;
use std::collections::HashMap;

/// Mapping `name -> Module`, populated once at startup and never mutated
/// again — lock-free reads. Lookup understands only module names; whether a
/// module advertises a given action is delegated to the module itself via
/// `Module::has_action`.
pub struct ModuleRegistry {
    modules: HashMap<String, Box<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new(modules: HashMap<String, Box<dyn Module>>) -> Self {
        Self { modules }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Module> {
        self.modules.get(name).map(|m| m.as_ref())
    }

    /// Resolve `(module, action)` to the module that advertises it, or
    /// `None` if the module is unknown or doesn't advertise that action.
    pub fn resolve(&self, module: &str, action: &str) -> Option<&dyn Module> {
        let module = self.get(module)?;
        if module.has_action(action) {
            Some(module)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// `module name -> advertised actions`, used to answer `agent.metadata`.
    pub fn directory(&self) -> std::collections::BTreeMap<String, Vec<String>> {
        self.modules
            .iter()
            .map(|(name, module)| (name.clone(), module.actions().to_vec()))
            .collect()
    }
}
