use super::definition::{ScenarioDefinition, ScenarioTier};
use std::collections::HashMap;

/// All scenario definitions available to the orchestrator, by name.
#[derive(Debug, Default)]
pub struct ScenarioRegistry {
    scenarios: HashMap<String, ScenarioDefinition>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self {
            scenarios: HashMap::new(),
        }
    }

    /// A registry preloaded with the built-in journeys.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::register_all(&mut registry);
        registry
    }

    /// Register a definition.
    /// Returns false if it was ignored because a loaded definition of the
    /// same name already shadows it.
    pub fn register(&mut self, definition: ScenarioDefinition) -> bool {
        if let Some(existing) = self.scenarios.get(&definition.name)
            && existing.tier == ScenarioTier::Loaded
            && definition.tier == ScenarioTier::BuiltIn
        {
            return false;
        }

        self.scenarios.insert(definition.name.clone(), definition);
        true
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioDefinition> {
        self.scenarios.get(name)
    }

    /// All definitions, sorted by name.
    pub fn list(&self) -> Vec<&ScenarioDefinition> {
        let mut list: Vec<_> = self.scenarios.values().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}
