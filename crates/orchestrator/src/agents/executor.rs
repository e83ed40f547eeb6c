use std::sync::Arc;

use agentflow_core::AgentType;
use async_trait::async_trait;
use serde_json::Value;

use super::{
    generate_json, str_field, tool_names, Agent, AgentContext, AgentPrompts, AgentResult,
};
use crate::llm::CompletionProvider;

/// General operations: API calls, file operations, data processing.
pub struct ExecutorAgent {
    provider: Arc<dyn CompletionProvider>,
    tools: Vec<String>,
}

impl ExecutorAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            tools: tool_names(&["api_call", "file_operation", "data_processing"]),
        }
    }
}

#[async_trait]
impl Agent for ExecutorAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Executor
    }

    fn tools(&self) -> &[String] {
        &self.tools
    }

    async fn execute(&self, context: &AgentContext) -> AgentResult {
        let response = match generate_json(
            self.provider.as_ref(),
            AgentType::Executor,
            AgentPrompts::executor(context),
        )
        .await
        {
            Ok(value) => value,
            Err(e) => return AgentResult::failure(e.to_string(), "Failed to execute task"),
        };

        // Only an explicit `false` counts as failure.
        let success = response.get("success") != Some(&Value::Bool(false));
        let result = response.get("result").filter(|v| !v.is_null()).cloned();
        let reasoning = str_field(&response, "reasoning", "Task executed");

        let outcome = if success {
            AgentResult::success(result, reasoning)
        } else {
            AgentResult {
                result,
                ..AgentResult::failure(
                    str_field(&response, "error", "Executor reported the task as unsuccessful"),
                    reasoning,
                )
            }
        };
        outcome.with_tools_used(&["execution_engine"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedProvider;
    use serde_json::json;

    fn ctx() -> AgentContext {
        AgentContext::new("Goal").with_task("Call the API")
    }

    #[tokio::test]
    async fn test_success_when_flag_missing() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"result": "200 OK"}"#));
        let result = ExecutorAgent::new(provider).execute(&ctx()).await;

        assert!(result.success);
        assert_eq!(result.result, Some(json!("200 OK")));
        assert_eq!(result.reasoning.as_deref(), Some("Task executed"));
        assert_eq!(result.tools_used, vec!["execution_engine".to_string()]);
    }

    #[tokio::test]
    async fn test_explicit_false_is_failure() {
        let provider = Arc::new(ScriptedProvider::replying(
            r#"{"result": null, "success": false, "error": "endpoint unreachable"}"#,
        ));
        let result = ExecutorAgent::new(provider).execute(&ctx()).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("endpoint unreachable"));
        assert!(result.result.is_none());
        assert_eq!(result.tools_used, vec!["execution_engine".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_response_is_failure() {
        let provider = Arc::new(ScriptedProvider::replying("not json at all"));
        let result = ExecutorAgent::new(provider).execute(&ctx()).await;

        assert!(!result.success);
        assert_eq!(result.reasoning.as_deref(), Some("Failed to execute task"));
        assert!(result.tools_used.is_empty());
    }

    #[test]
    fn test_advertised_tools() {
        let agent = ExecutorAgent::new(Arc::new(ScriptedProvider::default()));
        assert_eq!(
            agent.tools(),
            &["api_call", "file_operation", "data_processing"]
        );
    }
}
