use std::sync::Arc;
use std::time::Instant;

use agentflow_core::{
    AgentLog, AgentType, Execution, ExecutionStatus, LogLevel, Task, TaskStatus, ToolUsage,
    UpdateExecution, UpdateTask,
};
use events::{AgentPerformanceUpdate, Event, EventBus, ExecutionUpdate};
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::agents::{
    parse_plan_items, Agent, AgentContext, AgentRegistry, HistoryEntry, FINAL_ANALYSIS_TASK,
};
use crate::emitter::OrderedEventEmitter;
use crate::error::{OrchestratorError, Result};
use crate::state_machine::{ExecutionStateMachine, TaskStateMachine};
use crate::store::ExecutionStore;

/// Drives one goal through planning, sequential task execution and final analysis.
///
/// The orchestrator is the only writer of execution and task state. Every
/// state change is persisted first and then broadcast, so observers see the
/// changes of one execution in the order they happened. Cloning is cheap and
/// clones share the store, registry and event sequence.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    store: Arc<dyn ExecutionStore>,
    emitter: OrderedEventEmitter,
}

/// Mutable state of one in-flight execution.
struct Run {
    execution_id: Uuid,
    goal: String,
    status: ExecutionStatus,
    history: Vec<HistoryEntry>,
    /// Set once a task fault has been logged against its task.
    fault_logged: bool,
}

impl Orchestrator {
    pub fn new(registry: AgentRegistry, store: Arc<dyn ExecutionStore>, bus: EventBus) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            emitter: OrderedEventEmitter::new(bus),
        }
    }

    pub fn store(&self) -> &Arc<dyn ExecutionStore> {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        self.emitter.bus()
    }

    /// Create a pending execution for `goal` and run it in the background.
    ///
    /// Returns the pending record immediately; progress is observable through
    /// the store and the event bus.
    pub async fn submit(&self, goal: &str) -> Result<Execution> {
        Execution::validate_goal(goal)?;
        let execution = self.store.create_execution(&Execution::new(goal)).await?;
        info!(execution_id = %execution.id, "Execution submitted");

        let orchestrator = self.clone();
        let execution_id = execution.id;
        let goal = execution.goal.clone();
        tokio::spawn(async move {
            if let Err(e) = orchestrator.execute_goal(execution_id, &goal).await {
                error!(execution_id = %execution_id, error = %e, "Execution failed");
            }
        });

        Ok(execution)
    }

    /// Run a pending execution to a terminal state.
    ///
    /// Individual task failures do not stop the run. Planning failures and
    /// infrastructure faults mark the execution `failed` and are returned.
    pub async fn execute_goal(&self, execution_id: Uuid, goal: &str) -> Result<Execution> {
        let execution = self
            .store
            .get_execution(execution_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("execution {execution_id}")))?;
        ExecutionStateMachine::validate_transition(&execution.status, &ExecutionStatus::Planning)?;

        let mut run = Run {
            execution_id,
            goal: goal.to_string(),
            status: execution.status,
            history: Vec::new(),
            fault_logged: false,
        };

        match self.drive(&mut run).await {
            Ok(execution) => {
                info!(
                    execution_id = %execution_id,
                    successful_tasks = run.history.len(),
                    "Execution completed"
                );
                Ok(execution)
            }
            Err(err) => {
                self.fail_execution(&mut run, &err).await;
                Err(err)
            }
        }
    }

    /// Administrative cancel of a pending or running task.
    ///
    /// A cancelled pending task is skipped when its turn comes. A running agent
    /// is not interrupted, but its outcome is discarded.
    pub async fn cancel_task(&self, task_id: Uuid) -> Result<Task> {
        let task = self.current_task(task_id).await?;
        TaskStateMachine::validate_transition(&task.status, &TaskStatus::Cancelled)?;

        let Some(cancelled) = self
            .store
            .transition_task(task_id, task.status, UpdateTask::cancelled())
            .await?
        else {
            let current = self.current_task(task_id).await?;
            return Err(OrchestratorError::invalid_transition(
                current.status.as_str(),
                TaskStatus::Cancelled.as_str(),
            ));
        };
        info!(
            execution_id = %cancelled.execution_id,
            task_id = %task_id,
            from = %task.status.as_str(),
            "Task cancelled"
        );
        self.emitter.emit(Event::TaskUpdate(cancelled.clone()));
        Ok(cancelled)
    }

    async fn drive(&self, run: &mut Run) -> Result<Execution> {
        self.transition_execution(run, UpdateExecution::status(ExecutionStatus::Planning))
            .await?;
        self.emit_execution_update(ExecutionUpdate::new(run.execution_id, ExecutionStatus::Planning));

        self.record_log(AgentLog::new(
            run.execution_id,
            AgentType::Planner,
            "Starting execution planning",
            LogLevel::Info,
        ))
        .await?;
        self.emit_execution_update(
            ExecutionUpdate::new(run.execution_id, ExecutionStatus::Planning)
                .with_agent(AgentType::Planner),
        );

        let tasks = self.plan(run).await?;

        self.transition_execution(run, UpdateExecution::status(ExecutionStatus::Executing))
            .await?;
        self.emit_execution_update(ExecutionUpdate::new(
            run.execution_id,
            ExecutionStatus::Executing,
        ));

        for task in tasks {
            self.execute_task(run, task).await?;
        }

        let result = self.analyze(run).await?;

        let execution = self
            .transition_execution(run, UpdateExecution::completed(result))
            .await?;
        self.emit_execution_update(ExecutionUpdate::new(
            run.execution_id,
            ExecutionStatus::Completed,
        ));
        Ok(execution)
    }

    /// Ask the planner for a task list and persist it as pending tasks.
    async fn plan(&self, run: &Run) -> Result<Vec<Task>> {
        let planner = self.agent(AgentType::Planner)?;
        let context = AgentContext::new(&run.goal).with_tools(planner.tools());
        let outcome = planner.execute(&context).await;

        if !outcome.success {
            return Err(OrchestratorError::PlanningFailed(
                outcome.error.unwrap_or_else(|| "Planning failed".to_string()),
            ));
        }

        let plan_value = outcome.result.clone().unwrap_or_default();
        let plan = parse_plan_items(&plan_value).map_err(OrchestratorError::PlanningFailed)?;
        info!(execution_id = %run.execution_id, tasks = plan.len(), "Execution plan created");

        self.record_log(
            AgentLog::new(
                run.execution_id,
                AgentType::Planner,
                "Created execution plan",
                LogLevel::Success,
            )
            .with_input(json!({ "goal": run.goal }))
            .with_output(Some(plan_value))
            .with_reasoning(outcome.reasoning),
        )
        .await?;

        let mut tasks = Vec::with_capacity(plan.len());
        for (order, item) in plan.iter().enumerate() {
            let task = Task::new(
                run.execution_id,
                item.agent_type,
                item.description.clone(),
                order as i32,
            )
            .with_dependencies(&item.dependencies);
            let task = self.store.create_task(&task).await?;
            self.emitter.emit(Event::TaskUpdate(task.clone()));
            tasks.push(task);
        }

        Ok(tasks)
    }

    /// Run one task. Agent failures are recorded and swallowed; infrastructure
    /// faults mark the task failed on a best-effort basis and are returned.
    async fn execute_task(&self, run: &mut Run, task: Task) -> Result<()> {
        match self.run_task(run, &task).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let message = err.to_string();
                error!(
                    execution_id = %run.execution_id,
                    task_id = %task.id,
                    error = %message,
                    "Task aborted by infrastructure fault"
                );

                self.mark_task_faulted(task.id, &message).await;

                let log = AgentLog::new(
                    run.execution_id,
                    task.agent_type,
                    format!("Error: {message}"),
                    LogLevel::Error,
                )
                .with_task(task.id)
                .with_output(Some(json!({ "error": message })));
                match self.record_log(log).await {
                    Ok(()) => run.fault_logged = true,
                    Err(e) => warn!(task_id = %task.id, error = %e, "Could not record task error log"),
                }

                Err(err)
            }
        }
    }

    async fn run_task(&self, run: &mut Run, task: &Task) -> Result<()> {
        let agent_type = task.agent_type;
        let current = self.current_task(task.id).await?;
        if current.status == TaskStatus::Cancelled {
            info!(execution_id = %run.execution_id, task_id = %task.id, "Skipping cancelled task");
            return Ok(());
        }
        let agent = self.agent(agent_type)?;

        TaskStateMachine::validate_transition(&current.status, &TaskStatus::Running)?;
        let Some(running) = self
            .store
            .transition_task(task.id, current.status, UpdateTask::running())
            .await?
        else {
            info!(execution_id = %run.execution_id, task_id = %task.id, "Task cancelled before it started");
            return Ok(());
        };
        info!(
            execution_id = %run.execution_id,
            task_id = %task.id,
            agent = %agent_type,
            order = task.order,
            "Task started"
        );
        self.emitter.emit(Event::TaskUpdate(running.clone()));
        self.emit_execution_update(
            ExecutionUpdate::new(run.execution_id, ExecutionStatus::Executing)
                .with_agent(agent_type)
                .with_task(&task.description),
        );

        self.record_log(
            AgentLog::new(
                run.execution_id,
                agent_type,
                format!("Executing: {}", task.description),
                LogLevel::Info,
            )
            .with_task(task.id),
        )
        .await?;

        let context = AgentContext::new(&run.goal)
            .with_history(run.history.clone())
            .with_task(&task.description)
            .with_tools(agent.tools());
        let started = Instant::now();
        let outcome = agent.execute(&context).await;
        let duration_ms = started.elapsed().as_millis() as i64;
        debug!(task_id = %task.id, success = outcome.success, duration_ms, "Agent returned");

        if self.current_task(task.id).await?.status == TaskStatus::Cancelled {
            Self::discard_outcome(task, agent_type);
            return Ok(());
        }

        for tool in &outcome.tools_used {
            let mut usage = ToolUsage::new(run.execution_id, task.id, tool, outcome.success)
                .with_input(json!({ "task": task.description }))
                .with_output(outcome.result.clone());
            usage.duration_ms = Some(duration_ms);
            usage.error = outcome.error.clone();
            self.store.create_tool_usage(&usage).await?;
        }

        let finished = if outcome.success {
            TaskStateMachine::validate_transition(&running.status, &TaskStatus::Completed)?;
            let Some(completed) = self
                .store
                .transition_task(
                    task.id,
                    TaskStatus::Running,
                    UpdateTask::completed(outcome.result.clone()),
                )
                .await?
            else {
                Self::discard_outcome(task, agent_type);
                return Ok(());
            };
            self.record_log(
                AgentLog::new(
                    run.execution_id,
                    agent_type,
                    format!("Completed: {}", task.description),
                    LogLevel::Success,
                )
                .with_task(task.id)
                .with_output(outcome.result.clone())
                .with_reasoning(outcome.reasoning.clone()),
            )
            .await?;
            run.history.push(HistoryEntry {
                agent: agent_type,
                action: task.description.clone(),
                result: outcome.result,
            });
            completed
        } else {
            TaskStateMachine::validate_transition(&running.status, &TaskStatus::Failed)?;
            let error = outcome
                .error
                .unwrap_or_else(|| "Agent reported failure".to_string());
            warn!(task_id = %task.id, agent = %agent_type, error = %error, "Task failed");
            let Some(failed) = self
                .store
                .transition_task(task.id, TaskStatus::Running, UpdateTask::failed(error.clone()))
                .await?
            else {
                Self::discard_outcome(task, agent_type);
                return Ok(());
            };
            self.record_log(
                AgentLog::new(
                    run.execution_id,
                    agent_type,
                    format!("Failed: {}", task.description),
                    LogLevel::Error,
                )
                .with_task(task.id)
                .with_output(Some(json!({ "error": error })))
                .with_reasoning(outcome.reasoning),
            )
            .await?;
            failed
        };

        let analytics = self.store.get_analytics().await?;
        self.emitter
            .emit(Event::AgentPerformance(AgentPerformanceUpdate {
                agent_type,
                performance: analytics.performance_for(agent_type),
            }));

        self.emitter.emit(Event::TaskUpdate(finished));
        Ok(())
    }

    /// Final synthesis over the history. An unsuccessful analysis still lets the
    /// execution complete, with no result.
    async fn analyze(&self, run: &Run) -> Result<Option<serde_json::Value>> {
        let analyst = self.agent(AgentType::Analyst)?;
        let context = AgentContext::new(&run.goal)
            .with_history(run.history.clone())
            .with_task(FINAL_ANALYSIS_TASK)
            .with_tools(analyst.tools());
        let outcome = analyst.execute(&context).await;
        let history = serde_json::to_value(&run.history).unwrap_or_default();

        if outcome.success {
            self.record_log(
                AgentLog::new(
                    run.execution_id,
                    AgentType::Analyst,
                    "Final analysis completed",
                    LogLevel::Success,
                )
                .with_input(json!({ "history": history }))
                .with_output(outcome.result.clone())
                .with_reasoning(outcome.reasoning),
            )
            .await?;
            Ok(outcome.result)
        } else {
            let error = outcome
                .error
                .unwrap_or_else(|| "Analysis failed".to_string());
            warn!(execution_id = %run.execution_id, error = %error, "Final analysis failed");
            self.record_log(
                AgentLog::new(
                    run.execution_id,
                    AgentType::Analyst,
                    "Final analysis failed",
                    LogLevel::Error,
                )
                .with_input(json!({ "history": history }))
                .with_output(Some(json!({ "error": error })))
                .with_reasoning(outcome.reasoning),
            )
            .await?;
            Ok(None)
        }
    }

    /// Best effort: a failure here is traced, the causing error is still returned.
    async fn fail_execution(&self, run: &mut Run, cause: &OrchestratorError) {
        let message = cause.to_string();

        if run.status == ExecutionStatus::Pending {
            error!(
                execution_id = %run.execution_id,
                error = %message,
                "Execution failed before planning started"
            );
            return;
        }

        if !run.fault_logged {
            let agent_type = if run.status == ExecutionStatus::Planning {
                AgentType::Planner
            } else {
                AgentType::Analyst
            };
            let log = AgentLog::new(
                run.execution_id,
                agent_type,
                format!("Error: {message}"),
                LogLevel::Error,
            )
            .with_output(Some(json!({ "error": message })));
            if let Err(e) = self.record_log(log).await {
                warn!(execution_id = %run.execution_id, error = %e, "Could not record execution error log");
            }
        }

        match self
            .transition_execution(run, UpdateExecution::failed(message.clone()))
            .await
        {
            Ok(_) => {
                error!(execution_id = %run.execution_id, error = %message, "Execution marked failed");
                self.emit_execution_update(
                    ExecutionUpdate::new(run.execution_id, ExecutionStatus::Failed)
                        .with_error(message),
                );
            }
            Err(e) => error!(
                execution_id = %run.execution_id,
                error = %e,
                cause = %message,
                "Could not mark execution failed"
            ),
        }
    }

    /// Fault path for a task: a task that already finished keeps its state.
    async fn mark_task_faulted(&self, task_id: Uuid, message: &str) {
        let current = match self.store.get_task(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                warn!(task_id = %task_id, "Faulted task no longer exists");
                return;
            }
            Err(e) => {
                warn!(task_id = %task_id, error = %e, "Could not read faulted task");
                return;
            }
        };

        if let Err(e) = TaskStateMachine::validate_transition(&current.status, &TaskStatus::Failed) {
            warn!(
                task_id = %task_id,
                status = %current.status.as_str(),
                error = %e,
                "Keeping state of finished task"
            );
            return;
        }

        match self
            .store
            .transition_task(task_id, current.status, UpdateTask::failed(message))
            .await
        {
            Ok(Some(failed)) => self.emitter.emit(Event::TaskUpdate(failed)),
            Ok(None) => warn!(task_id = %task_id, "Task changed state before it could be marked failed"),
            Err(e) => warn!(task_id = %task_id, error = %e, "Could not mark task failed"),
        }
    }

    fn discard_outcome(task: &Task, agent_type: AgentType) {
        warn!(
            task_id = %task.id,
            agent = %agent_type,
            "Task cancelled while running, outcome discarded"
        );
    }

    async fn transition_execution(
        &self,
        run: &mut Run,
        update: UpdateExecution,
    ) -> Result<Execution> {
        let to = update.status.unwrap_or(run.status);
        ExecutionStateMachine::validate_transition(&run.status, &to)?;

        let execution = self.store.update_execution(run.execution_id, update).await?;
        info!(
            execution_id = %run.execution_id,
            from = %run.status.as_str(),
            to = %to.as_str(),
            "Execution state transition"
        );
        run.status = to;
        Ok(execution)
    }

    async fn record_log(&self, log: AgentLog) -> Result<()> {
        let log = self.store.create_agent_log(&log).await?;
        self.emitter.emit(Event::Log(log));
        Ok(())
    }

    fn emit_execution_update(&self, update: ExecutionUpdate) {
        self.emitter.emit(Event::ExecutionUpdate(update));
    }

    async fn current_task(&self, task_id: Uuid) -> Result<Task> {
        self.store
            .get_task(task_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(format!("task {task_id}")))
    }

    fn agent(&self, agent_type: AgentType) -> Result<Arc<dyn Agent>> {
        self.registry
            .get(agent_type)
            .ok_or(OrchestratorError::AgentNotFound(agent_type))
    }
}
