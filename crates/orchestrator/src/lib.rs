//! Execution orchestration: plans a goal into tasks, runs each task through
//! the matching agent in order, and reports every state change.

pub mod agents;
mod emitter;
pub mod error;
pub mod llm;
mod orchestrator;
pub mod state_machine;
pub mod store;

pub use agents::{
    Agent, AgentContext, AgentRegistry, AgentResult, HistoryEntry, PlanItem,
    FINAL_ANALYSIS_TASK,
};
pub use emitter::OrderedEventEmitter;
pub use error::{OrchestratorError, Result};
pub use llm::{ChatClient, CompletionProvider, CompletionRequest, LlmConfig, LlmError};
pub use orchestrator::Orchestrator;
pub use state_machine::{ExecutionStateMachine, TaskStateMachine};
pub use store::{ExecutionStore, SqlStore};
