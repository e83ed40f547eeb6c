use std::sync::Arc;

use agentflow_core::AgentType;
use async_trait::async_trait;
use serde_json::json;

use super::{
    field_or, generate_json, str_field, tool_names, Agent, AgentContext, AgentPrompts,
    AgentResult,
};
use crate::llm::CompletionProvider;

/// Writes and explains code. Result: `{code, language, execution_result, explanation}`.
pub struct CoderAgent {
    provider: Arc<dyn CompletionProvider>,
    tools: Vec<String>,
}

impl CoderAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            tools: tool_names(&["code_execution", "debugging"]),
        }
    }
}

#[async_trait]
impl Agent for CoderAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Coder
    }

    fn tools(&self) -> &[String] {
        &self.tools
    }

    async fn execute(&self, context: &AgentContext) -> AgentResult {
        match generate_json(
            self.provider.as_ref(),
            AgentType::Coder,
            AgentPrompts::coder(context),
        )
        .await
        {
            Ok(response) => AgentResult::success(
                Some(json!({
                    "code": field_or(&response, "code", json!(null)),
                    "language": str_field(&response, "language", "javascript"),
                    "execution_result": field_or(&response, "execution_result", json!(null)),
                    "explanation": field_or(&response, "explanation", json!(null)),
                })),
                str_field(&response, "reasoning", "Code written and tested"),
            )
            .with_tools_used(&["code_generator", "code_executor"]),
            Err(e) => AgentResult::failure(e.to_string(), "Failed to complete coding task"),
        }
    }
}
