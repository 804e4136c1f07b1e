use std::collections::HashMap;

use serde_json::Value;

use crate::tool::Tool;

/// Name-addressed collection of tools, dispatching `execute` by unpacking
/// `args` into the named tool's `execute`.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Replaces any existing tool of the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn unregister(&mut self, name: &str) {
        self.tools.remove(name);
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.has(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_definitions(&self) -> Vec<Value> {
        let mut names = self.tool_names();
        names.sort();
        names
            .into_iter()
            .map(|name| {
                let tool = &self.tools[&name];
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema(),
                    }
                })
            })
            .collect()
    }

    /// Dispatches to the named tool. Unknown names return a string
    /// beginning `"Error"` and containing `"not found"`; never raises.
    pub async fn execute(&self, name: &str, args: Value) -> String {
        match self.tools.get(name) {
            Some(tool) => tool.execute(args).await,
            None => format!("Error: tool '{name}' not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes its input"
        }
        fn parameters_schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, args: Value) -> String {
            args.to_string()
        }
    }

    #[tokio::test]
    async fn register_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.has("echo"));
        assert_eq!(registry.execute("echo", serde_json::json!({"x": 1})).await, "{\"x\":1}");
    }

    #[tokio::test]
    async fn execute_unknown_tool_returns_error_string_not_found() {
        let registry = ToolRegistry::new();
        let result = registry.execute("nonexistent", Value::Null).await;
        assert!(result.starts_with("Error"));
        assert!(result.contains("not found"));
    }

    #[test]
    fn register_replaces_existing_tool_of_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(EchoTool));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.unregister("echo");
        assert!(!registry.has("echo"));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn get_definitions_exposes_function_shape() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        let defs = registry.get_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0]["type"], "function");
        assert_eq!(defs[0]["function"]["name"], "echo");
    }

    #[test]
    fn contains_is_alias_for_has() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.contains("echo"));
        assert!(!registry.contains("missing"));
    }
}
