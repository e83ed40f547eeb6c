use std::sync::Arc;

use agentflow_core::AgentType;
use async_trait::async_trait;
use serde_json::json;

use super::{
    field_or, generate_json, str_field, tool_names, Agent, AgentContext, AgentPrompts,
    AgentResult,
};
use crate::llm::CompletionProvider;

/// Gathers information. Result: `{findings, summary}`.
pub struct ResearcherAgent {
    provider: Arc<dyn CompletionProvider>,
    tools: Vec<String>,
}

impl ResearcherAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            tools: tool_names(&["web_search", "data_scraping"]),
        }
    }
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Researcher
    }

    fn tools(&self) -> &[String] {
        &self.tools
    }

    async fn execute(&self, context: &AgentContext) -> AgentResult {
        match generate_json(
            self.provider.as_ref(),
            AgentType::Researcher,
            AgentPrompts::researcher(context),
        )
        .await
        {
            Ok(response) => AgentResult::success(
                Some(json!({
                    "findings": field_or(&response, "findings", json!([])),
                    "summary": field_or(&response, "summary", json!("Research completed")),
                })),
                str_field(&response, "reasoning", "Research conducted"),
            )
            .with_tools_used(&["web_search", "analysis"]),
            Err(e) => AgentResult::failure(e.to_string(), "Failed to complete research"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedProvider;

    #[tokio::test]
    async fn test_research_result_shape() {
        let provider = Arc::new(ScriptedProvider::replying(
            json!({
                "reasoning": "searched docs",
                "findings": [{"source": "docs", "data": "x", "relevance": "high"}],
                "summary": "Found it"
            })
            .to_string(),
        ));
        let result = ResearcherAgent::new(provider)
            .execute(&AgentContext::new("g").with_task("Find docs"))
            .await;

        assert!(result.success);
        let payload = result.result.unwrap();
        assert_eq!(payload["summary"], "Found it");
        assert_eq!(payload["findings"][0]["source"], "docs");
        assert_eq!(
            result.tools_used,
            vec!["web_search".to_string(), "analysis".to_string()]
        );
    }

    #[tokio::test]
    async fn test_defaults_for_missing_fields() {
        let provider = Arc::new(ScriptedProvider::replying("{}"));
        let result = ResearcherAgent::new(provider)
            .execute(&AgentContext::new("g"))
            .await;

        assert!(result.success);
        assert_eq!(
            result.result,
            Some(json!({"findings": [], "summary": "Research completed"}))
        );
        assert_eq!(result.reasoning.as_deref(), Some("Research conducted"));
    }

    #[tokio::test]
    async fn test_failure_reasoning() {
        let provider = Arc::new(ScriptedProvider::failing("quota exceeded"));
        let result = ResearcherAgent::new(provider)
            .execute(&AgentContext::new("g"))
            .await;

        assert!(!result.success);
        assert_eq!(
            result.reasoning.as_deref(),
            Some("Failed to complete research")
        );
    }
}
