use std::sync::Arc;

use agentflow_core::AgentType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{generate_json, str_field, Agent, AgentContext, AgentPrompts, AgentResult};
use crate::llm::CompletionProvider;

/// One validated step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub description: String,
    pub agent_type: AgentType,
    /// Declared by the planner, kept on the task, not used for scheduling.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Validate a list of plan items.
///
/// Every item needs a non-empty `description` and an `agentType` naming an
/// agent other than the planner. Dependencies may be strings or numbers.
pub fn parse_plan_items(value: &Value) -> Result<Vec<PlanItem>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "Invalid plan format: tasks must be an array".to_string())?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_plan_item(index, item))
        .collect()
}

fn parse_plan_item(index: usize, item: &Value) -> Result<PlanItem, String> {
    let description = item
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| format!("Invalid plan format: task {index} has no description"))?;

    let raw_agent = item.get("agentType").and_then(Value::as_str).unwrap_or("");
    let agent_type = raw_agent
        .parse::<AgentType>()
        .ok()
        .filter(AgentType::is_assignable)
        .ok_or_else(|| {
            format!("Invalid plan format: task {index} has unknown agent type '{raw_agent}'")
        })?;

    let dependencies = match item.get("dependencies") {
        Some(Value::Array(deps)) => deps
            .iter()
            .filter_map(|d| match d {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(PlanItem {
        description: description.to_string(),
        agent_type,
        dependencies,
    })
}

/// Breaks the goal into an ordered task list.
pub struct PlannerAgent {
    provider: Arc<dyn CompletionProvider>,
    tools: Vec<String>,
}

impl PlannerAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            tools: Vec::new(),
        }
    }
}

#[async_trait]
impl Agent for PlannerAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Planner
    }

    fn tools(&self) -> &[String] {
        &self.tools
    }

    async fn execute(&self, context: &AgentContext) -> AgentResult {
        const FALLBACK: &str = "Failed to create execution plan";

        let response = match generate_json(
            self.provider.as_ref(),
            AgentType::Planner,
            AgentPrompts::planner(context),
        )
        .await
        {
            Ok(value) => value,
            Err(e) => return AgentResult::failure(e.to_string(), FALLBACK),
        };

        let tasks = response.get("tasks").unwrap_or(&Value::Null);
        match parse_plan_items(tasks) {
            Ok(plan) => match serde_json::to_value(&plan) {
                Ok(result) => AgentResult::success(
                    Some(result),
                    str_field(&response, "reasoning", "Created execution plan"),
                ),
                Err(e) => AgentResult::failure(e.to_string(), FALLBACK),
            },
            Err(message) => AgentResult::failure(message, FALLBACK),
        }
    }
}
