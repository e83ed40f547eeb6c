//! The agent capability contract and its five variants.

mod analyst;
mod coder;
mod executor;
mod planner;
mod prompts;
mod registry;
mod researcher;
mod response;

pub use analyst::{AnalystAgent, FINAL_ANALYSIS_TASK};
pub use coder::CoderAgent;
pub use executor::ExecutorAgent;
pub use planner::{parse_plan_items, PlanItem, PlannerAgent};
pub use prompts::AgentPrompts;
pub use registry::AgentRegistry;
pub use researcher::ResearcherAgent;
pub use response::parse_json_response;

use agentflow_core::AgentType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::llm::{CompletionProvider, CompletionRequest, LlmResult};

/// A prior successful task outcome, as later agents see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub agent: AgentType,
    pub action: String,
    pub result: Option<Value>,
}

/// Everything an agent is given for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContext {
    pub goal: String,
    pub history: Vec<HistoryEntry>,
    pub current_task: Option<String>,
    pub available_tools: Vec<String>,
}

impl AgentContext {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.current_task = Some(task.into());
        self
    }

    pub fn with_tools(mut self, tools: &[String]) -> Self {
        self.available_tools = tools.to_vec();
        self
    }

    pub fn task(&self) -> &str {
        self.current_task.as_deref().unwrap_or_default()
    }
}

/// Outcome of one agent invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub success: bool,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
}

impl AgentResult {
    pub fn success(result: Option<Value>, reasoning: impl Into<String>) -> Self {
        Self {
            success: true,
            result,
            reasoning: Some(reasoning.into()),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            reasoning: Some(reasoning.into()),
            ..Default::default()
        }
    }

    pub fn with_tools_used(mut self, tools: &[&str]) -> Self {
        self.tools_used = tools.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// A named capability: given a context, produce a result.
///
/// `execute` must not fail. Generation errors and malformed responses are
/// reported as `AgentResult { success: false, .. }`.
#[async_trait]
pub trait Agent: Send + Sync {
    fn agent_type(&self) -> AgentType;

    /// Tool names advertised to the agent through its context.
    fn tools(&self) -> &[String];

    async fn execute(&self, context: &AgentContext) -> AgentResult;
}

/// Run one JSON-mode completion and decode the response.
async fn generate_json(
    provider: &dyn CompletionProvider,
    agent: AgentType,
    prompt: String,
) -> LlmResult<Value> {
    debug!(agent = %agent, prompt_len = prompt.len(), "Requesting completion");
    let raw = provider
        .complete(CompletionRequest::json(AgentPrompts::system(agent), prompt))
        .await?;
    parse_json_response(&raw)
}

/// String field of a response object, or `default` when missing or not a string.
fn str_field(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Field of a response object, or `default` when missing or null.
fn field_or(value: &Value, key: &str, default: Value) -> Value {
    match value.get(key) {
        Some(Value::Null) | None => default,
        Some(v) => v.clone(),
    }
}

fn tool_names(tools: &[&str]) -> Vec<String> {
    tools.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm::{CompletionProvider, CompletionRequest, LlmError, LlmResult};

    /// Provider answering from a fixed queue of responses.
    #[derive(Default)]
    pub struct ScriptedProvider {
        responses: Mutex<VecDeque<LlmResult<String>>>,
        pub requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        pub fn replying(response: impl Into<String>) -> Self {
            let provider = Self::default();
            provider.push(Ok(response.into()));
            provider
        }

        pub fn failing(message: &str) -> Self {
            let provider = Self::default();
            provider.push(Err(LlmError::Api {
                message: message.to_string(),
                status_code: Some(400),
            }));
            provider
        }

        pub fn push(&self, response: LlmResult<String>) {
            self.responses.lock().unwrap().push_back(response);
        }

        pub fn last_prompt(&self) -> String {
            self.requests
                .lock()
                .unwrap()
                .last()
                .map(|r| r.prompt.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse))
        }
    }
}
