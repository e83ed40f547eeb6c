use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::CoreError;

/// The five agent roles. The orchestrator dispatches on this value.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Planner,
    Executor,
    Researcher,
    Coder,
    Analyst,
}

impl AgentType {
    pub const ALL: [AgentType; 5] = [
        Self::Planner,
        Self::Executor,
        Self::Researcher,
        Self::Coder,
        Self::Analyst,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Executor => "executor",
            Self::Researcher => "researcher",
            Self::Coder => "coder",
            Self::Analyst => "analyst",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planner" => Some(Self::Planner),
            "executor" => Some(Self::Executor),
            "researcher" => Some(Self::Researcher),
            "coder" => Some(Self::Coder),
            "analyst" => Some(Self::Analyst),
            _ => None,
        }
    }

    /// Agents the planner may assign work to.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Self::Planner)
    }
}

impl FromStr for AgentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim()).ok_or_else(|| CoreError::InvalidAgentType(s.to_string()))
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
