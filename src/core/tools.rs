//! Tool registry for model function calls.
//!
//! The browser registers the tool definitions with its realtime session and
//! forwards `function_call` requests back here for execution.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown function '{0}'")]
    UnknownTool(String),

    #[error("Unable to parse arguments JSON: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Arguments as sent by the model: either an object or a JSON-encoded string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    Object(Map<String, Value>),
    Raw(String),
}

impl Default for ToolArguments {
    fn default() -> Self {
        Self::Object(Map::new())
    }
}

impl ToolArguments {
    /// Normalize into an object, parsing the string form if needed.
    pub fn into_object(self) -> ToolResult<Map<String, Value>> {
        match self {
            Self::Object(map) => Ok(map),
            Self::Raw(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(ToolError::InvalidArguments(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                ))),
                Err(e) => Err(ToolError::InvalidArguments(e.to_string())),
            },
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Executes one tool.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, arguments: Map<String, Value>) -> ToolResult<Map<String, Value>>;
}

/// Adapter turning an async closure into a [`ToolExecutor`].
pub struct FnTool<F>(pub F);

#[async_trait]
impl<F, Fut> ToolExecutor for FnTool<F>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = ToolResult<Map<String, Value>>> + Send,
{
    async fn execute(&self, arguments: Map<String, Value>) -> ToolResult<Map<String, Value>> {
        (self.0)(arguments).await
    }
}

struct RegisteredTool {
    definition: Value,
    executor: Arc<dyn ToolExecutor>,
}

/// Ordered set of tools keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Re-registering a name replaces the previous entry
    /// but keeps its position.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        definition: Value,
        executor: Arc<dyn ToolExecutor>,
    ) {
        let name = name.into();
        let tool = RegisteredTool {
            definition,
            executor,
        };
        match self.index.get(&name) {
            Some(&position) => self.tools[position] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool definitions in registration order.
    pub fn list_definitions(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub async fn execute(
        &self,
        name: &str,
        arguments: ToolArguments,
    ) -> ToolResult<Map<String, Value>> {
        let executor = self
            .index
            .get(name)
            .map(|&position| Arc::clone(&self.tools[position].executor))
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let arguments = arguments.into_object()?;
        executor.execute(arguments).await
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.index.iter().collect();
        names.sort_by_key(|(_, position)| **position);
        f.debug_struct("ToolRegistry")
            .field("tools", &names.into_iter().map(|(n, _)| n).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_tool() -> Arc<dyn ToolExecutor> {
        Arc::new(FnTool(|arguments: Map<String, Value>| async move {
            let mut output = Map::new();
            output.insert("echo".into(), Value::Object(arguments));
            Ok::<_, ToolError>(output)
        }))
    }

    fn definition(name: &str) -> Value {
        json!({"type": "function", "name": name, "parameters": {"type": "object"}})
    }

    #[test]
    fn test_definitions_in_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register("zeta", definition("zeta"), echo_tool());
        registry.register("alpha", definition("alpha"), echo_tool());

        let names: Vec<_> = registry
            .list_definitions()
            .into_iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_reregister_keeps_position() {
        let mut registry = ToolRegistry::new();
        registry.register("a", definition("a"), echo_tool());
        registry.register("b", definition("b"), echo_tool());
        registry.register("a", json!({"name": "a", "v": 2}), echo_tool());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list_definitions()[0]["v"], 2);
    }

    #[tokio::test]
    async fn test_execute_with_object_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", definition("echo"), echo_tool());

        let args: ToolArguments = serde_json::from_value(json!({"sign": "leo"})).unwrap();
        let output = registry.execute("echo", args).await.unwrap();
        assert_eq!(Value::Object(output), json!({"echo": {"sign": "leo"}}));
    }

    #[tokio::test]
    async fn test_execute_with_string_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", definition("echo"), echo_tool());

        let args: ToolArguments = serde_json::from_value(json!("{\"sign\":\"leo\"}")).unwrap();
        let output = registry.execute("echo", args).await.unwrap();
        assert_eq!(output["echo"]["sign"], "leo");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.execute("missing", ToolArguments::default()).await;
        assert!(matches!(result, Err(ToolError::UnknownTool(name)) if name == "missing"));
    }

    #[tokio::test]
    async fn test_invalid_string_arguments() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", definition("echo"), echo_tool());

        let result = registry
            .execute("echo", ToolArguments::Raw("{not json".into()))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));

        let result = registry
            .execute("echo", ToolArguments::Raw("[1,2]".into()))
            .await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn test_execution_error_propagates() {
        let mut registry = ToolRegistry::new();
        registry.register(
            "fail",
            definition("fail"),
            Arc::new(FnTool(|_args: Map<String, Value>| async {
                Err::<Map<String, Value>, _>(ToolError::Execution("boom".into()))
            })),
        );

        let result = registry.execute("fail", ToolArguments::default()).await;
        assert!(matches!(result, Err(ToolError::Execution(msg)) if msg == "boom"));
    }
}
