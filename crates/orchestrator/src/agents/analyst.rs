use std::sync::Arc;

use agentflow_core::AgentType;
use async_trait::async_trait;
use serde_json::json;

use super::{
    field_or, generate_json, str_field, tool_names, Agent, AgentContext, AgentPrompts,
    AgentResult,
};
use crate::llm::CompletionProvider;

/// Task description used for the closing synthesis of every execution.
pub const FINAL_ANALYSIS_TASK: &str = "Analyze all results and create final summary";

/// Synthesizes earlier results. Result: `{insights, summary, conclusion}`.
pub struct AnalystAgent {
    provider: Arc<dyn CompletionProvider>,
    tools: Vec<String>,
}

impl AnalystAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            tools: tool_names(&["data_analysis", "insight_generation"]),
        }
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Analyst
    }

    fn tools(&self) -> &[String] {
        &self.tools
    }

    async fn execute(&self, context: &AgentContext) -> AgentResult {
        match generate_json(
            self.provider.as_ref(),
            AgentType::Analyst,
            AgentPrompts::analyst(context),
        )
        .await
        {
            Ok(response) => AgentResult::success(
                Some(json!({
                    "insights": field_or(&response, "insights", json!([])),
                    "summary": field_or(&response, "summary", json!("Analysis completed")),
                    "conclusion": field_or(&response, "conclusion", json!("")),
                })),
                str_field(&response, "reasoning", "Analysis performed"),
            )
            .with_tools_used(&["analysis_engine"]),
            Err(e) => AgentResult::failure(e.to_string(), "Failed to complete analysis"),
        }
    }
}
