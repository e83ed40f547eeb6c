use std::collections::HashMap;
use std::sync::Arc;

use agentflow_core::AgentType;

use super::{
    Agent, AnalystAgent, CoderAgent, ExecutorAgent, PlannerAgent, ResearcherAgent,
};
use crate::llm::CompletionProvider;

/// Lookup of agents by their type.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentType, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five agents sharing one completion provider.
    pub fn standard(provider: Arc<dyn CompletionProvider>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlannerAgent::new(provider.clone())));
        registry.register(Arc::new(ExecutorAgent::new(provider.clone())));
        registry.register(Arc::new(ResearcherAgent::new(provider.clone())));
        registry.register(Arc::new(CoderAgent::new(provider.clone())));
        registry.register(Arc::new(AnalystAgent::new(provider)));
        registry
    }

    /// Registers under the agent's own type, returning any agent it replaces.
    pub fn register(&mut self, agent: Arc<dyn Agent>) -> Option<Arc<dyn Agent>> {
        self.agents.insert(agent.agent_type(), agent)
    }

    pub fn unregister(&mut self, agent_type: AgentType) -> Option<Arc<dyn Agent>> {
        self.agents.remove(&agent_type)
    }

    pub fn get(&self, agent_type: AgentType) -> Option<Arc<dyn Agent>> {
        self.agents.get(&agent_type).cloned()
    }

    pub fn agent_types(&self) -> Vec<AgentType> {
        let mut types: Vec<_> = self.agents.keys().copied().collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.agent_types())
            .finish()
    }
}
