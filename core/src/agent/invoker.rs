use crate::agent::ToolRegistry;
use crate::traits::ToolCall;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Placeholder correlation id for requests that arrive without one.
pub const SENTINEL_REQUEST_ID: &str = "unknown";

/// Error descriptor kinds visible to the model in result payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationErrorKind {
    MalformedRequest,
    CapabilityNotFound,
    CapabilityFailed,
}

impl InvocationErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::CapabilityNotFound => "capability_not_found",
            Self::CapabilityFailed => "capability_failed",
        }
    }
}

/// Outcome of one tool invocation, correlated to the request id. The
/// payload is canonical text: the tool's rendered return value, or a
/// serialized error descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub request_id: String,
    pub payload: String,
}

impl InvocationResult {
    fn ok(request_id: &str, payload: String) -> Self {
        Self {
            request_id: request_id.to_string(),
            payload,
        }
    }

    fn fault(request_id: &str, kind: InvocationErrorKind, message: &str) -> Self {
        let payload = json!({
            "error": { "kind": kind.as_str(), "message": message }
        })
        .to_string();
        Self {
            request_id: request_id.to_string(),
            payload,
        }
    }

    /// The error kind carried in the payload, if this result is a fault.
    pub fn error_kind(&self) -> Option<InvocationErrorKind> {
        let value: serde_json::Value = serde_json::from_str(&self.payload).ok()?;
        match value.get("error")?.get("kind")?.as_str()? {
            "malformed_request" => Some(InvocationErrorKind::MalformedRequest),
            "capability_not_found" => Some(InvocationErrorKind::CapabilityNotFound),
            "capability_failed" => Some(InvocationErrorKind::CapabilityFailed),
            _ => None,
        }
    }
}

/// Executes one tool call against the registry inside a failure boundary:
/// every call produces exactly one correlated result, and no tool fault
/// ever escapes to abort the session.
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub async fn invoke(&self, call: &ToolCall) -> InvocationResult {
        if call.id.trim().is_empty() {
            return InvocationResult::fault(
                SENTINEL_REQUEST_ID,
                InvocationErrorKind::MalformedRequest,
                "tool call is missing a request id",
            );
        }
        if call.name.trim().is_empty() {
            return InvocationResult::fault(
                &call.id,
                InvocationErrorKind::MalformedRequest,
                "tool call is missing a tool name",
            );
        }

        let args = if call.arguments.trim().is_empty() {
            json!({})
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(value) => value,
                Err(e) => {
                    return InvocationResult::fault(
                        &call.id,
                        InvocationErrorKind::MalformedRequest,
                        &format!("arguments for '{}' are not valid JSON: {e}", call.name),
                    );
                }
            }
        };

        let tool = match self.registry.resolve(&call.name) {
            Ok(tool) => tool,
            Err(e) => {
                return InvocationResult::fault(
                    &call.id,
                    InvocationErrorKind::CapabilityNotFound,
                    &e.to_string(),
                );
            }
        };

        debug!(tool = %call.name, id = %call.id, "executing tool");
        match tool.execute(args).await {
            Ok(output) => InvocationResult::ok(&call.id, output.render()),
            Err(e) => {
                error!(tool = %call.name, "tool execution failed: {e}");
                InvocationResult::fault(
                    &call.id,
                    InvocationErrorKind::CapabilityFailed,
                    &format!("tool '{}' failed: {e}", call.name),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Tool, ToolError, ToolOutput};
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "repeats its input"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }

        async fn execute(&self, args: serde_json::Value) -> Result<ToolOutput, ToolError> {
            let text = args
                .get("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::InvalidInput("missing 'text'".to_string()))?;
            Ok(ToolOutput::Text(text.to_string()))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: serde_json::Value) -> Result<ToolOutput, ToolError> {
            Err(ToolError::Upstream("service is down".to_string()))
        }
    }

    struct ListTool;

    #[async_trait]
    impl Tool for ListTool {
        fn name(&self) -> &str {
            "list"
        }

        fn description(&self) -> &str {
            "returns records"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: serde_json::Value) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::Structured(json!([{"n": 1}, {"n": 2}])))
        }
    }

    fn invoker_with(tools: Vec<Arc<dyn Tool>>) -> ToolInvoker {
        let registry = Arc::new(ToolRegistry::new());
        for tool in tools {
            registry.register(tool).unwrap();
        }
        ToolInvoker::new(registry)
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn result_id_matches_request_id() {
        let invoker = invoker_with(vec![Arc::new(EchoTool)]);
        let result = invoker
            .invoke(&call("call_1", "echo", r#"{"text": "hello"}"#))
            .await;
        assert_eq!(result.request_id, "call_1");
        assert_eq!(result.payload, "hello");
        assert_eq!(result.error_kind(), None);
    }

    #[tokio::test]
    async fn structured_output_is_json_encoded() {
        let invoker = invoker_with(vec![Arc::new(ListTool)]);
        let result = invoker.invoke(&call("call_2", "list", "{}")).await;
        let parsed: serde_json::Value = serde_json::from_str(&result.payload).unwrap();
        assert_eq!(parsed[1]["n"], 2);
    }

    #[tokio::test]
    async fn unknown_tool_is_contained() {
        let invoker = invoker_with(vec![Arc::new(EchoTool)]);
        let result = invoker.invoke(&call("call_3", "missing", "{}")).await;
        assert_eq!(result.request_id, "call_3");
        assert_eq!(
            result.error_kind(),
            Some(InvocationErrorKind::CapabilityNotFound)
        );
        // the payload names what is actually available
        assert!(result.payload.contains("echo"));
    }

    #[tokio::test]
    async fn missing_id_uses_sentinel() {
        let invoker = invoker_with(vec![Arc::new(EchoTool)]);
        let result = invoker.invoke(&call("", "echo", "{}")).await;
        assert_eq!(result.request_id, SENTINEL_REQUEST_ID);
        assert_eq!(
            result.error_kind(),
            Some(InvocationErrorKind::MalformedRequest)
        );
    }

    #[tokio::test]
    async fn missing_name_is_malformed() {
        let invoker = invoker_with(vec![Arc::new(EchoTool)]);
        let result = invoker.invoke(&call("call_4", "", "{}")).await;
        assert_eq!(result.request_id, "call_4");
        assert_eq!(
            result.error_kind(),
            Some(InvocationErrorKind::MalformedRequest)
        );
    }

    #[tokio::test]
    async fn unparseable_arguments_are_malformed() {
        let invoker = invoker_with(vec![Arc::new(EchoTool)]);
        let result = invoker.invoke(&call("call_5", "echo", "{not json")).await;
        assert_eq!(
            result.error_kind(),
            Some(InvocationErrorKind::MalformedRequest)
        );
    }

    #[tokio::test]
    async fn empty_arguments_mean_no_arguments() {
        let invoker = invoker_with(vec![Arc::new(FailingTool)]);
        let result = invoker.invoke(&call("call_6", "broken", "")).await;
        // reached execution (and failed there), not rejected as malformed
        assert_eq!(
            result.error_kind(),
            Some(InvocationErrorKind::CapabilityFailed)
        );
    }

    #[tokio::test]
    async fn tool_fault_is_contained() {
        let invoker = invoker_with(vec![Arc::new(FailingTool)]);
        let result = invoker.invoke(&call("call_7", "broken", "{}")).await;
        assert_eq!(result.request_id, "call_7");
        assert_eq!(
            result.error_kind(),
            Some(InvocationErrorKind::CapabilityFailed)
        );
        assert!(result.payload.contains("broken"));
        assert!(result.payload.contains("service is down"));
    }

    #[tokio::test]
    async fn tool_level_invalid_input_is_a_failure_payload() {
        let invoker = invoker_with(vec![Arc::new(EchoTool)]);
        // well-formed request, but the arguments miss the tool's schema
        let result = invoker
            .invoke(&call("call_8", "echo", r#"{"wrong": 1}"#))
            .await;
        assert_eq!(
            result.error_kind(),
            Some(InvocationErrorKind::CapabilityFailed)
        );
    }
}
