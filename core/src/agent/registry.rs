use crate::traits::{Tool, ToolSpec};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown tool '{name}' (available: {})", .known.join(", "))]
    NotFound { name: String, known: Vec<String> },

    #[error("tool '{0}' is already registered")]
    Duplicate(String),
}

/// Name → tool mapping. Registration order is preserved and is the order
/// the tool set is advertised to the model, so it stays stable for a
/// fixed registry state.
pub struct ToolRegistry {
    tools: Mutex<Vec<Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Mutex::new(Vec::new()),
        }
    }

    /// Add a tool under its own name. Registering a name twice is refused;
    /// overwriting goes through [`replace`](Self::replace) only.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let mut tools = self.tools.lock().unwrap();
        if tools.iter().any(|t| t.name() == tool.name()) {
            return Err(RegistryError::Duplicate(tool.name().to_string()));
        }
        tools.push(tool);
        Ok(())
    }

    /// Overwrite the registration under an existing name, keeping its
    /// position; appends when the name is new.
    pub fn replace(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.lock().unwrap();
        match tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => tools[index] = tool,
            None => tools.push(tool),
        }
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        let tools = self.tools.lock().unwrap();
        tools
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
                known: tools.iter().map(|t| t.name().to_string()).collect(),
            })
    }

    /// Every registered tool, in registration order.
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.lock().unwrap().clone()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.lock().unwrap().iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ToolError, ToolOutput};
    use async_trait::async_trait;

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: serde_json::Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::Text(self.0.to_string()))
        }
    }

    #[test]
    fn register_then_resolve_round_trips() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("alpha"))).unwrap();
        let tool = registry.resolve("alpha").unwrap();
        assert_eq!(tool.name(), "alpha");
    }

    #[test]
    fn resolve_miss_lists_known_names() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("alpha"))).unwrap();
        registry.register(Arc::new(NamedTool("beta"))).unwrap();

        let err = match registry.resolve("gamma") {
            Ok(_) => panic!("expected resolve to fail"),
            Err(err) => err,
        };
        match err {
            RegistryError::NotFound { name, known } => {
                assert_eq!(name, "gamma");
                assert_eq!(known, ["alpha", "beta"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("alpha"))).unwrap();
        let err = registry.register(Arc::new(NamedTool("alpha"))).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "alpha"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn replace_keeps_position() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool("alpha"))).unwrap();
        registry.register(Arc::new(NamedTool("beta"))).unwrap();
        registry.replace(Arc::new(NamedTool("alpha")));

        let names: Vec<String> = registry.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["alpha", "beta"]);
    }

    #[test]
    fn specs_follow_registration_order() {
        let registry = ToolRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(Arc::new(NamedTool(name))).unwrap();
        }
        let names: Vec<String> = registry.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["c", "a", "b"]);
        // stable across calls for a fixed registry state
        let again: Vec<String> = registry.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, again);

        let tools: Vec<String> = registry
            .all()
            .into_iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(tools, names);
    }
}
