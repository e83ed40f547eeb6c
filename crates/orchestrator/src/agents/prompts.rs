use agentflow_core::AgentType;

use super::{AgentContext, HistoryEntry};

/// Instructions sent to the model for each agent role.
pub struct AgentPrompts;

impl AgentPrompts {
    pub fn system(agent: AgentType) -> &'static str {
        match agent {
            AgentType::Planner => PLANNER_SYSTEM,
            AgentType::Executor => EXECUTOR_SYSTEM,
            AgentType::Researcher => RESEARCHER_SYSTEM,
            AgentType::Coder => CODER_SYSTEM,
            AgentType::Analyst => ANALYST_SYSTEM,
        }
    }

    pub fn planner(ctx: &AgentContext) -> String {
        format!(
            r#"Goal: {goal}

Break this goal into an ordered list of concrete tasks. Assign every task to
exactly one of: executor, researcher, coder, analyst.

Respond with valid JSON only."#,
            goal = ctx.goal
        )
    }

    pub fn executor(ctx: &AgentContext) -> String {
        format!(
            r#"Task: {task}

Goal context: {goal}

Carry out this task and report the result. If it cannot really be executed
here, describe the result a real execution would produce.

Respond with valid JSON only."#,
            task = ctx.task(),
            goal = ctx.goal
        )
    }

    pub fn researcher(ctx: &AgentContext) -> String {
        format!(
            r#"Research task: {task}

Goal context: {goal}

Gather the information this task needs. Live web access is not available, so
report the findings a thorough search would realistically return.

Respond with valid JSON only."#,
            task = ctx.task(),
            goal = ctx.goal
        )
    }

    pub fn coder(ctx: &AgentContext) -> String {
        format!(
            r#"Coding task: {task}

Goal context: {goal}

Write production-quality code for this task and explain it. Include the
expected output if the code is meant to be run.

Respond with valid JSON only."#,
            task = ctx.task(),
            goal = ctx.goal
        )
    }

    pub fn analyst(ctx: &AgentContext) -> String {
        format!(
            r#"Analysis task: {task}

Goal context: {goal}

Previous task results:
{history}

Analyze everything above. Report insights, patterns and recommendations.

Respond with valid JSON only."#,
            task = ctx.task(),
            goal = ctx.goal,
            history = Self::format_history(&ctx.history)
        )
    }

    /// One `agent: result` line per entry.
    pub fn format_history(history: &[HistoryEntry]) -> String {
        history
            .iter()
            .map(|entry| {
                let result = entry
                    .result
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "null".to_string());
                format!("{}: {}", entry.agent, result)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

const PLANNER_SYSTEM: &str = r#"You are the Planner agent. You turn a goal into a sequence of concrete subtasks.

Assign each subtask to the agent best suited for it:
- executor: general operations, API calls, data processing
- researcher: searching for and gathering information
- coder: writing, debugging and running code
- analyst: analyzing results, producing insights and summaries

Order the tasks so that each one can build on the results of the ones before it.

Output format (JSON):
{
  "reasoning": "How you approached the plan",
  "tasks": [
    {
      "description": "Specific, achievable task",
      "agentType": "executor | researcher | coder | analyst",
      "dependencies": []
    }
  ]
}"#;

const EXECUTOR_SYSTEM: &str = r#"You are the Executor agent. You perform general operations: API calls, file operations and data processing.

Output format (JSON):
{
  "reasoning": "How the task was carried out",
  "result": "The result of the task",
  "success": true
}

Set "success" to false and add an "error" field if the task could not be completed."#;

const RESEARCHER_SYSTEM: &str = r#"You are the Researcher agent. You gather and synthesize information.

Output format (JSON):
{
  "reasoning": "Research approach",
  "findings": [
    {
      "source": "Where the information comes from",
      "data": "What was found",
      "relevance": "Why it matters for the task"
    }
  ],
  "summary": "Summary of the research"
}"#;

const CODER_SYSTEM: &str = r#"You are the Coder agent. You write, debug and run code.

Output format (JSON):
{
  "reasoning": "Design decisions",
  "code": "The code",
  "language": "Programming language",
  "execution_result": "Output of running the code, if applicable",
  "explanation": "Short explanation of the code"
}"#;

const ANALYST_SYSTEM: &str = r#"You are the Analyst agent. You analyze the results of earlier tasks and produce insights and summaries.

Output format (JSON):
{
  "reasoning": "Analysis approach",
  "insights": [
    {
      "finding": "Key insight",
      "significance": "Why it matters",
      "recommendation": "Suggested action"
    }
  ],
  "summary": "Executive summary",
  "conclusion": "Final conclusions and recommendations"
}"#;
